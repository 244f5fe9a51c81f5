pub mod config;
pub mod error;
pub mod db;
pub mod ingest;
pub mod embeddings;
pub mod search;
pub mod llm;
pub mod workflow;
pub mod context;
pub mod eval;

pub use config::Config;
pub use context::RagContext;
pub use error::{GroundragError, Result};
pub use workflow::{Interaction, Outcome, Pipeline, Termination, NO_INFORMATION_ANSWER};
