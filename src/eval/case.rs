//! Eval case type and pass/fail logic for the evaluation framework.

use crate::error::{GroundragError, Result};
use crate::workflow::Outcome;
use serde::Deserialize;
use std::path::Path;

/// What a case expects the pipeline to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    /// A grounded answer (the knowledge file covers the question).
    Answer,
    /// The no-information fallback.
    Fallback,
}

/// Single labelled question.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub question: String,
    /// Category for reporting (e.g. in_scope, out_of_scope, adversarial).
    #[serde(default)]
    pub category: String,
    pub expect: Expectation,
    /// Optional: substring the answer must contain (case-insensitive). Only
    /// checked for `expect: "answer"` cases.
    #[serde(default)]
    pub expected_contains: Option<String>,
}

impl EvalCase {
    /// True if `outcome` satisfies this case.
    pub fn passes(&self, outcome: &Outcome) -> bool {
        match (self.expect, outcome) {
            (Expectation::Fallback, Outcome::NoInformation) => true,
            (Expectation::Answer, Outcome::Answer(answer)) => match &self.expected_contains {
                Some(needle) => answer.to_lowercase().contains(&needle.to_lowercase()),
                None => true,
            },
            _ => false,
        }
    }
}

/// Read a JSON array of cases from `path`.
pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| GroundragError::Parse(format!("Invalid cases JSON in {}: {}", path.display(), e)))
}
