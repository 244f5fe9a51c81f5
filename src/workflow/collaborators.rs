//! Interfaces the answer graph depends on.
//!
//! Every call is awaited to completion before the graph moves on. Any `Err`
//! returned here aborts the whole interaction; nothing is retried.

use super::state::Passage;
use crate::error::Result;
use async_trait::async_trait;

/// Similarity search over the knowledge store.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Ordered candidate passages for `question`. An empty result is valid.
    async fn search(&self, question: &str) -> Result<Vec<Passage>>;
}

/// Verdict of the relevance grader for one passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceVerdict {
    pub relevant: bool,
}

/// Decides whether a single passage is relevant to the question.
#[async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn score(&self, question: &str, passage: &str) -> Result<RelevanceVerdict>;
}

/// Produces an answer from the question and the surviving passages.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Only ever called with a non-empty `passages` slice.
    async fn answer(&self, question: &str, passages: &[Passage]) -> Result<String>;
}

/// Verdict of the groundedness grader for a generated answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroundednessVerdict {
    pub grounded: bool,
}

/// Decides whether an answer is supported by the passages it was generated from.
#[async_trait]
pub trait GroundednessJudge: Send + Sync {
    async fn score(&self, passages: &[Passage], answer: &str) -> Result<GroundednessVerdict>;
}
