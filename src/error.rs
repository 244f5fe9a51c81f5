use thiserror::Error;

/// Main error type for groundrag
#[derive(Error, Debug)]
pub enum GroundragError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding endpoint errors
    #[error("Embedding API error: {0}")]
    Embedding(String),

    /// Chat completion endpoint errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// A grader answered with something other than a binary score
    #[error("Malformed {judge} verdict: {raw:?}")]
    MalformedVerdict { judge: &'static str, raw: String },

    /// Retriever faults
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using GroundragError
pub type Result<T> = std::result::Result<T, GroundragError>;
