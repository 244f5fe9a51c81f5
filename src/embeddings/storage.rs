use crate::db::Db;
use crate::error::{Result, GroundragError};
use rusqlite::params;

/// Encode an embedding as a BLOB (little-endian f32 array)
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Decode an embedding BLOB back to `Vec<f32>`
///
/// Returns None when the BLOB length is not a multiple of 4.
pub fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }

    blob.chunks(4)
        .map(|bytes| {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(arr))
        })
        .collect()
}

/// Store multiple embeddings in one transaction
///
/// # Arguments
///
/// * `db` - Database connection wrapper
/// * `embeddings` - Vector of (passage_id, embedding) tuples
///
/// # Returns
///
/// Number of passages updated
pub async fn store_embeddings_batch(
    db: &Db,
    embeddings: Vec<(String, Vec<f32>)>,
) -> Result<usize> {
    if embeddings.is_empty() {
        return Ok(0);
    }

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        let mut updated = 0;

        {
            let mut stmt = tx.prepare("UPDATE passages SET embedding = ?1 WHERE passage_id = ?2")?;
            for (passage_id, embedding) in &embeddings {
                let rows = stmt.execute(params![encode_embedding(embedding), passage_id])?;
                if rows == 0 {
                    return Err(GroundragError::Retrieval(format!(
                        "Passage not found while storing embedding: {}",
                        passage_id
                    )));
                }
                updated += rows;
            }
        }

        tx.commit()?;
        Ok::<usize, GroundragError>(updated)
    })
    .await
}

/// Return (passage_id, passage_text) for every passage that has no embedding yet, in position order.
pub async fn get_passages_without_embedding(db: &Db) -> Result<Vec<(String, String)>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT passage_id, passage_text FROM passages \
             WHERE embedding IS NULL ORDER BY doc_id, position",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rows)
    })
    .await
}
