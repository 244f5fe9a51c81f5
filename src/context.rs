//! Process-wide resources shared by every question.
//!
//! Built once at startup. Queries only read from it.

use crate::config::Config;
use crate::db::{migrate, Db};
use crate::embeddings::EmbeddingClient;
use crate::error::Result;
use crate::ingest::{ingest_knowledge_file, IngestReport};
use crate::llm::{ChatClient, LlmAnswerGenerator, LlmGroundednessJudge, LlmRelevanceJudge};
use crate::search::{VectorRetriever, VectorStore};
use crate::workflow::{Interaction, Pipeline};
use std::sync::Arc;

pub struct RagContext {
    config: Config,
    db: Db,
    retriever: VectorRetriever,
    relevance: LlmRelevanceJudge,
    generator: LlmAnswerGenerator,
    groundedness: LlmGroundednessJudge,
    ingest_report: IngestReport,
}

impl RagContext {
    /// Open the store, index the knowledge file if it changed, load the
    /// vectors and connect the chat model.
    pub async fn initialize(config: Config) -> Result<Self> {
        let (db, embedder, ingest_report) = open_index(&config, false).await?;

        let store = VectorStore::load(&db, &ingest_report.doc_path).await?;
        if store.is_empty() {
            log::warn!("Knowledge store is empty; every question will get the fallback answer");
        }
        let retriever = VectorRetriever::new(store, embedder, &config.retrieval);

        let chat = Arc::new(ChatClient::from_config(&config.llm)?);
        log::info!("Chat model: {} at {}", chat.model(), config.llm.base_url);

        Ok(Self {
            retriever,
            relevance: LlmRelevanceJudge::new(Arc::clone(&chat)),
            generator: LlmAnswerGenerator::new(Arc::clone(&chat)),
            groundedness: LlmGroundednessJudge::new(chat),
            config,
            db,
            ingest_report,
        })
    }

    /// A pipeline over this context's collaborators.
    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(
            &self.retriever,
            &self.relevance,
            &self.generator,
            &self.groundedness,
        )
        .with_relevance_concurrency(self.config.retrieval.relevance_concurrency)
    }

    /// What the startup ingestion did.
    pub fn ingest_report(&self) -> &IngestReport {
        &self.ingest_report
    }

    pub fn passage_count(&self) -> usize {
        self.retriever.store().len()
    }

    /// Answer one question and shut down, also when the interaction fails.
    /// An interaction error takes precedence over a shutdown error.
    pub async fn run_once(self, question: &str) -> Result<Interaction> {
        let result = self.pipeline().run(question).await;
        let shutdown = self.shutdown().await;
        let interaction = result?;
        shutdown?;
        Ok(interaction)
    }

    /// Flush the write-ahead log and release everything.
    pub async fn shutdown(self) -> Result<()> {
        self.db
            .with_connection(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await?;
        log::info!("Context shut down");
        Ok(())
    }
}

/// (Re)index the knowledge file without building a full context.
pub async fn ingest(config: &Config, force: bool) -> Result<IngestReport> {
    let (_, _, report) = open_index(config, force).await?;
    Ok(report)
}

async fn open_index(config: &Config, force: bool) -> Result<(Db, Arc<EmbeddingClient>, IngestReport)> {
    if let Some(parent) = config.db_path().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn)).await?;
    log::info!("Database ready at {}", config.db_path().display());

    let embedder = Arc::new(EmbeddingClient::from_config(&config.embeddings)?);
    let report = ingest_knowledge_file(
        &db,
        &embedder,
        config.knowledge_file(),
        &config.chunking,
        force,
    )
    .await?;

    Ok((db, embedder, report))
}
