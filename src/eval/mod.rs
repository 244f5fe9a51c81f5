//! Evaluation framework: labelled question set, outcome scoring (accuracy,
//! fallback precision/recall) and the `eval` CLI.

pub mod case;
pub mod metrics;

pub use case::{load_cases, EvalCase, Expectation};
pub use metrics::{accuracy, fallback_precision, fallback_recall, CaseResult};
