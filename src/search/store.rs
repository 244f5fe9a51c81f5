//! In-memory copy of the passage embeddings.
//!
//! Loaded once from the database when the context is built; read-only afterwards.

use crate::db::Db;
use crate::embeddings::decode_embedding;
use crate::error::{Result, GroundragError};
use rusqlite::params;

/// A passage with its embedding
#[derive(Debug, Clone)]
pub struct StoredPassage {
    pub passage_id: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A passage scored against a query
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage_id: String,
    pub text: String,
    pub score: f32,
    pub rank: usize,
}

/// Read-only vector store
#[derive(Debug, Default)]
pub struct VectorStore {
    passages: Vec<StoredPassage>,
}

impl VectorStore {
    pub fn from_passages(passages: Vec<StoredPassage>) -> Self {
        Self { passages }
    }

    /// Load the embedded passages of the document stored under `doc_path`, in position order.
    pub async fn load(db: &Db, doc_path: &str) -> Result<Self> {
        let doc_path = doc_path.to_string();
        let passages = db
            .with_connection(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT p.passage_id, p.passage_text, p.embedding FROM passages p \
                     INNER JOIN documents d ON p.doc_id = d.doc_id \
                     WHERE d.doc_path = ?1 AND p.embedding IS NOT NULL \
                     ORDER BY p.position",
                )?;
                let mut rows = stmt.query(params![doc_path])?;
                let mut passages = Vec::new();
                while let Some(row) = rows.next()? {
                    let passage_id: String = row.get(0)?;
                    let text: String = row.get(1)?;
                    let blob: Vec<u8> = row.get(2)?;
                    match decode_embedding(&blob) {
                        Some(embedding) => passages.push(StoredPassage {
                            passage_id,
                            text,
                            embedding,
                        }),
                        None => log::warn!("Skipping passage {} with corrupt embedding", passage_id),
                    }
                }
                Ok::<Vec<StoredPassage>, GroundragError>(passages)
            })
            .await?;

        log::info!("Vector store loaded: {} passages", passages.len());
        Ok(Self { passages })
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Top `k` passages by cosine similarity, descending. Ties keep store order.
    ///
    /// Passages scoring below `min_score` (when set) are dropped. A stored
    /// embedding of a different width than the query is a retrieval fault.
    pub fn top_k(&self, query: &[f32], k: usize, min_score: Option<f32>) -> Result<Vec<ScoredPassage>> {
        let mut scored: Vec<(f32, &StoredPassage)> = Vec::with_capacity(self.passages.len());

        for passage in &self.passages {
            if passage.embedding.len() != query.len() {
                return Err(GroundragError::Retrieval(format!(
                    "Embedding dimension mismatch: query has {}, passage {} has {}",
                    query.len(),
                    passage.passage_id,
                    passage.embedding.len()
                )));
            }
            let score = cosine_similarity(query, &passage.embedding);
            if min_score.is_some_and(|min| score < min) {
                continue;
            }
            scored.push((score, passage));
        }

        // stable sort keeps store order for equal scores
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(idx, (score, passage))| ScoredPassage {
                passage_id: passage.passage_id.clone(),
                text: passage.text.clone(),
                score,
                rank: idx + 1,
            })
            .collect())
    }
}

/// Compute cosine similarity between two equal-length vectors
///
/// Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
