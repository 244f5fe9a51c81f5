//! Edge predicates. They read the state and return a label; they never change it.

use super::collaborators::GroundednessJudge;
use super::state::WorkingState;
use crate::error::Result;

/// Where to go after relevance grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateDecision {
    Generate,
    NoContext,
}

/// Where to go after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundednessDecision {
    /// Generation is the sentinel; accepted without asking the judge.
    Trusted,
    /// Judge confirmed the answer is supported by the passages.
    Grounded,
    /// Judge rejected the answer.
    NotSupported,
}

impl GroundednessDecision {
    /// Both accepted outcomes end the graph as-is.
    pub fn is_useful(self) -> bool {
        !matches!(self, Self::NotSupported)
    }
}

/// Any surviving passage is enough to attempt an answer.
pub fn decide_to_generate(state: &WorkingState) -> GenerateDecision {
    if state.documents.is_empty() {
        log::info!("decision: no relevant passages, ending without an answer");
        GenerateDecision::NoContext
    } else {
        log::info!("decision: generate");
        GenerateDecision::Generate
    }
}

/// Verify the generation against the filtered passages.
///
/// The sentinel (or a missing generation, which callers read as the sentinel)
/// is never sent to the judge.
pub async fn check_groundedness(
    state: &WorkingState,
    judge: &dyn GroundednessJudge,
) -> Result<GroundednessDecision> {
    if state.is_fallback() {
        return Ok(GroundednessDecision::Trusted);
    }
    let generation = state.final_answer();

    log::info!("check_groundedness: verifying answer against {} passages", state.documents.len());
    let verdict = judge.score(&state.documents, generation).await?;

    if verdict.grounded {
        log::info!("decision: answer is grounded in the passages");
        Ok(GroundednessDecision::Grounded)
    } else {
        log::info!("decision: answer is not grounded in the passages");
        Ok(GroundednessDecision::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::{Passage, NO_INFORMATION_ANSWER};
    use crate::workflow::testing::ScriptedGroundedness;

    fn state(docs: &[&str], generation: Option<&str>) -> WorkingState {
        let mut state = WorkingState::new("q");
        state.documents = docs.iter().map(|d| Passage::from(*d)).collect();
        state.generation = generation.map(str::to_string);
        state
    }

    #[test]
    fn test_no_documents_routes_to_no_context() {
        assert_eq!(decide_to_generate(&state(&[], None)), GenerateDecision::NoContext);
    }

    #[test]
    fn test_single_survivor_routes_to_generate() {
        assert_eq!(decide_to_generate(&state(&["p"], None)), GenerateDecision::Generate);
    }

    #[tokio::test]
    async fn test_sentinel_is_never_verified() {
        let judge = ScriptedGroundedness::returning(false);
        let decision = check_groundedness(&state(&["p"], Some(NO_INFORMATION_ANSWER)), &judge)
            .await
            .unwrap();
        assert_eq!(decision, GroundednessDecision::Trusted);
        assert!(decision.is_useful());
        assert!(judge.calls().is_empty());
    }

    #[tokio::test]
    async fn test_grounded_answer_is_useful() {
        let judge = ScriptedGroundedness::returning(true);
        let decision = check_groundedness(&state(&["p"], Some("Paris.")), &judge).await.unwrap();
        assert_eq!(decision, GroundednessDecision::Grounded);
        assert_eq!(judge.calls(), vec![(vec![Passage::from("p")], "Paris.".to_string())]);
    }

    #[tokio::test]
    async fn test_ungrounded_answer_is_not_supported() {
        let judge = ScriptedGroundedness::returning(false);
        let decision = check_groundedness(&state(&["p"], Some("Lyon.")), &judge).await.unwrap();
        assert_eq!(decision, GroundednessDecision::NotSupported);
        assert!(!decision.is_useful());
    }

    #[tokio::test]
    async fn test_judge_fault_propagates() {
        let judge = ScriptedGroundedness::failing();
        let result = check_groundedness(&state(&["p"], Some("Paris.")), &judge).await;
        assert!(result.is_err());
    }
}
