use crate::config::RetrievalConfig;
use crate::embeddings::EmbeddingClient;
use crate::error::Result;
use crate::search::store::VectorStore;
use crate::workflow::{Passage, Retriever};
use async_trait::async_trait;
use std::sync::Arc;

/// Dense retriever: embeds the question and returns the nearest passages.
pub struct VectorRetriever {
    store: VectorStore,
    embedder: Arc<EmbeddingClient>,
    k: usize,
    min_score: Option<f32>,
}

impl VectorRetriever {
    pub fn new(store: VectorStore, embedder: Arc<EmbeddingClient>, config: &RetrievalConfig) -> Self {
        Self {
            store,
            embedder,
            k: config.k,
            min_score: config.min_score,
        }
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn search(&self, question: &str) -> Result<Vec<Passage>> {
        if self.store.is_empty() {
            log::debug!("Vector store is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let start = std::time::Instant::now();
        let query_vec = self.embedder.embed_query(question).await?;
        let results = self.store.top_k(&query_vec, self.k, self.min_score)?;

        for result in &results {
            log::debug!("#{} {} (score {:.3})", result.rank, result.passage_id, result.score);
        }
        log::debug!("Vector search took {:?}", start.elapsed());

        Ok(results.into_iter().map(|r| Passage::new(r.text)).collect())
    }
}
