pub mod metadata;
pub mod chunker;
pub mod db_writer;

pub use chunker::{Chunk, chunk_text, estimate_tokens};
pub use db_writer::{count_passages, delete_documents_except, get_document_hash, replace_document};
pub use metadata::{doc_id_for_path, sha256_hex};

use crate::config::ChunkingConfig;
use crate::db::Db;
use crate::embeddings::{get_passages_without_embedding, store_embeddings_batch, EmbeddingClient};
use crate::error::Result;
use std::path::Path;

/// Summary of one ingestion run
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub doc_path: String,
    /// Passages written for the document (0 when skipped)
    pub passages: usize,
    pub tokens: usize,
    /// Passages that received an embedding during this run
    pub embedded: usize,
    /// True when the stored content hash matched and re-chunking was skipped
    pub skipped: bool,
    /// Documents from other paths deleted so only the knowledge file stays retrievable
    pub pruned: usize,
}

/// Index the knowledge file: read → hash → chunk → store passages → embed.
///
/// Unchanged files (same SHA256 as stored) are not re-chunked unless `force` is
/// set, but any passage still lacking an embedding is embedded either way.
pub async fn ingest_knowledge_file(
    db: &Db,
    embedder: &EmbeddingClient,
    path: &Path,
    chunking: &ChunkingConfig,
    force: bool,
) -> Result<IngestReport> {
    let content = std::fs::read_to_string(path)?;
    let file_hash = sha256_hex(content.as_bytes());
    let doc_path = canonical_doc_path(path)?;

    let stored_hash = get_document_hash(db, &doc_path).await?;
    let unchanged = stored_hash.as_deref() == Some(file_hash.as_str());

    let (passages, tokens, skipped) = if unchanged && !force {
        log::info!("{} unchanged since last ingestion, skipping chunking", doc_path);
        (0, 0, true)
    } else {
        let chunks = chunk_text(&content, chunking);
        let passages = chunks.len();
        let tokens = chunks.iter().map(|c| c.tokens).sum::<usize>();
        if chunks.is_empty() {
            log::warn!("{} has no text to index", doc_path);
        }
        replace_document(db, &doc_path, &content, &file_hash, chunks).await?;
        log::info!("Stored {} passages (~{} tokens) from {}", passages, tokens, doc_path);
        (passages, tokens, false)
    };

    let pruned = delete_documents_except(db, &doc_path).await?;
    if pruned > 0 {
        log::info!("Removed {} documents that are no longer the knowledge file", pruned);
    }

    let embedded = embed_missing_passages(db, embedder).await?;

    Ok(IngestReport {
        doc_path,
        passages,
        tokens,
        embedded,
        skipped,
        pruned,
    })
}

/// The key a knowledge file is stored under: its absolute, symlink-free path
/// with forward slashes, so `./k.txt` and `k.txt` are the same document.
pub fn canonical_doc_path(path: &Path) -> Result<String> {
    let canonical = std::fs::canonicalize(path)?;
    Ok(canonical.to_string_lossy().replace('\\', "/"))
}

/// Embed every stored passage that has no embedding yet. Returns how many were embedded.
pub async fn embed_missing_passages(db: &Db, embedder: &EmbeddingClient) -> Result<usize> {
    let pending = get_passages_without_embedding(db).await?;
    if pending.is_empty() {
        return Ok(0);
    }

    log::info!("Embedding {} passages with {}", pending.len(), embedder.model());
    let texts: Vec<String> = pending.iter().map(|(_, text)| text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let rows: Vec<(String, Vec<f32>)> = pending
        .into_iter()
        .map(|(id, _)| id)
        .zip(embeddings)
        .collect();

    store_embeddings_batch(db, rows).await
}
