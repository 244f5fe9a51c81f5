use rusqlite::{params, OptionalExtension};
use chrono::Utc;
use crate::error::{Result, GroundragError};
use crate::db::Db;
use super::chunker::Chunk;
use super::metadata::doc_id_for_path;

/// Stored content hash for a document path, if it has been ingested before
pub async fn get_document_hash(db: &Db, doc_path: &str) -> Result<Option<String>> {
    let doc_path = doc_path.to_string();
    db.with_connection(move |conn| {
        let hash = conn
            .query_row(
                "SELECT file_hash FROM documents WHERE doc_path = ?1",
                params![doc_path],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(hash)
    })
    .await
}

/// Insert or replace a document together with all of its passages
///
/// Old passages (and their embeddings) are removed first so a changed file never
/// mixes stale and fresh passages. Returns the document id.
pub async fn replace_document(
    db: &Db,
    doc_path: &str,
    content: &str,
    file_hash: &str,
    chunks: Vec<Chunk>,
) -> Result<String> {
    let doc_id = doc_id_for_path(doc_path);
    let total_tokens: usize = chunks.iter().map(|c| c.tokens).sum();

    let doc_id_clone = doc_id.clone();
    let doc_path = doc_path.to_string();
    let content = content.to_string();
    let file_hash = file_hash.to_string();
    let ingested_at = Utc::now().to_rfc3339();

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM passages WHERE doc_id = ?1", params![doc_id_clone])?;

        tx.execute(
            r#"
            INSERT INTO documents (doc_id, doc_path, content_text, content_tokens, file_hash, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(doc_path) DO UPDATE SET
                doc_id = excluded.doc_id,
                content_text = excluded.content_text,
                content_tokens = excluded.content_tokens,
                file_hash = excluded.file_hash,
                ingested_at = excluded.ingested_at
            "#,
            params![
                doc_id_clone,
                doc_path,
                content,
                total_tokens as i64,
                file_hash,
                ingested_at,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO passages (passage_id, doc_id, position, passage_text, tokens) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for chunk in &chunks {
                stmt.execute(params![
                    uuid::Uuid::new_v4().to_string(),
                    doc_id_clone,
                    chunk.position as i64,
                    chunk.text,
                    chunk.tokens as i64,
                ])?;
            }
        }

        tx.commit()?;
        Ok::<(), GroundragError>(())
    })
    .await?;

    Ok(doc_id)
}

/// Delete every document (and, by cascade, its passages) not stored under `doc_path`.
/// Returns how many documents were removed.
pub async fn delete_documents_except(db: &Db, doc_path: &str) -> Result<usize> {
    let doc_path = doc_path.to_string();
    db.with_connection(move |conn| {
        let removed = conn.execute("DELETE FROM documents WHERE doc_path <> ?1", params![doc_path])?;
        Ok(removed)
    })
    .await
}

/// Number of stored passages (all documents)
pub async fn count_passages(db: &Db) -> Result<usize> {
    db.with_connection(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))?;
        Ok(count as usize)
    })
    .await
}
