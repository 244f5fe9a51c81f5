use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub groundrag: GroundragConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

/// Knowledge source and store locations
#[derive(Debug, Clone, Deserialize)]
pub struct GroundragConfig {
    /// Plain text file whose contents are indexed and answered from.
    pub knowledge_file: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Embeddings endpoint configuration (OpenAI-compatible `/embeddings`)
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Name of the env var holding a bearer token. Local servers need none.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Expected embedding width; responses of another width are rejected.
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_embedding_model(),
            api_key_env: None,
            batch_size: default_batch_size(),
            dimensions: None,
        }
    }
}

/// Chat completion endpoint configuration (OpenAI-compatible `/chat/completions`)
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_llm_model(),
            temperature: 0.0,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retrieval and relevance-filter tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub min_score: Option<f32>,
    /// Number of relevance grading calls allowed in flight at once.
    #[serde(default = "default_relevance_concurrency")]
    pub relevance_concurrency: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            min_score: None,
            relevance_concurrency: default_relevance_concurrency(),
        }
    }
}

/// Passage chunking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size_tokens: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: default_chunk_size(),
            chunk_overlap_tokens: default_chunk_overlap(),
        }
    }
}

fn default_local_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_llm_model() -> String {
    "llama3.1".to_string()
}

fn default_batch_size() -> usize {
    64
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_k() -> usize {
    4
}

fn default_relevance_concurrency() -> usize {
    1
}

fn default_chunk_size() -> usize {
    300
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in GROUNDRAG_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("GROUNDRAG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_path(&config_path)
    }

    /// Read, parse and validate a specific config file.
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        let knowledge_file = &self.groundrag.knowledge_file;
        if !knowledge_file.exists() {
            anyhow::bail!(
                "knowledge_file does not exist: {}. Set groundrag.knowledge_file in config.toml.",
                knowledge_file.display()
            );
        }

        if !knowledge_file.is_file() {
            anyhow::bail!(
                "knowledge_file must be a file, not a directory: {}",
                knowledge_file.display()
            );
        }

        for env_name in [&self.embeddings.api_key_env, &self.llm.api_key_env]
            .into_iter()
            .flatten()
        {
            std::env::var(env_name).with_context(|| {
                format!(
                    "Environment variable {} not set. Set it in your .env file or remove api_key_env from config.toml.",
                    env_name
                )
            })?;
        }

        if self.embeddings.batch_size == 0 {
            anyhow::bail!("embeddings.batch_size must be greater than 0");
        }

        if self.retrieval.k == 0 {
            anyhow::bail!("retrieval.k must be greater than 0");
        }

        if let Some(min_score) = self.retrieval.min_score {
            if !(-1.0..=1.0).contains(&min_score) {
                anyhow::bail!("retrieval.min_score must be between -1.0 and 1.0");
            }
        }

        if self.retrieval.relevance_concurrency == 0 {
            anyhow::bail!("retrieval.relevance_concurrency must be greater than 0");
        }

        if self.chunking.chunk_size_tokens == 0 {
            anyhow::bail!("chunking.chunk_size_tokens must be greater than 0");
        }

        if self.chunking.chunk_overlap_tokens >= self.chunking.chunk_size_tokens {
            anyhow::bail!("chunking.chunk_overlap_tokens must be less than chunk_size_tokens");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.groundrag.db_path
    }

    /// Get the knowledge file path
    pub fn knowledge_file(&self) -> &Path {
        &self.groundrag.knowledge_file
    }
}
