//! Evaluation metrics: outcome accuracy and fallback precision / recall.
//!
//! "Positive" means the pipeline fell back. Precision asks how many fallbacks
//! were warranted; recall asks how many warranted fallbacks happened.

use crate::eval::{EvalCase, Expectation};
use crate::workflow::Outcome;

/// One evaluated case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: EvalCase,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.case.passes(&self.outcome)
    }
}

/// Share of cases that passed. Returns 0.0 for an empty set.
pub fn accuracy(results: &[CaseResult]) -> f32 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed()).count();
    passed as f32 / results.len() as f32
}

/// (fallbacks on fallback cases) / (all fallbacks). Returns 1.0 when the
/// pipeline never fell back, since no fallback was wrong.
pub fn fallback_precision(results: &[CaseResult]) -> f32 {
    let fell_back: Vec<&CaseResult> = results.iter().filter(|r| r.outcome.is_fallback()).collect();
    if fell_back.is_empty() {
        return 1.0;
    }
    let warranted = fell_back
        .iter()
        .filter(|r| r.case.expect == Expectation::Fallback)
        .count();
    warranted as f32 / fell_back.len() as f32
}

/// (fallbacks on fallback cases) / (all fallback cases). Returns 1.0 when no
/// case expects a fallback.
pub fn fallback_recall(results: &[CaseResult]) -> f32 {
    let expected: Vec<&CaseResult> = results
        .iter()
        .filter(|r| r.case.expect == Expectation::Fallback)
        .collect();
    if expected.is_empty() {
        return 1.0;
    }
    let caught = expected.iter().filter(|r| r.outcome.is_fallback()).count();
    caught as f32 / expected.len() as f32
}
