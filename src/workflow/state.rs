//! Per-question working state threaded through the answer graph.

/// The one answer returned whenever nothing trustworthy can be said.
///
/// It doubles as a marker: a generation equal to this text is never sent to the
/// groundedness judge.
pub const NO_INFORMATION_ANSWER: &str = "No information found for this question.";

/// A retrieved unit of evidence, identified only by its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    content: String,
}

impl Passage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl From<&str> for Passage {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Passage {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// Mutable record for one interaction. Created per question, dropped at END.
///
/// Only the node actions in this module mutate it; routing functions get `&WorkingState`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingState {
    pub(super) question: String,
    pub(super) documents: Vec<Passage>,
    pub(super) generation: Option<String>,
}

impl WorkingState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: None,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn documents(&self) -> &[Passage] {
        &self.documents
    }

    pub fn generation(&self) -> Option<&str> {
        self.generation.as_deref()
    }

    /// True when the state carries no usable answer: nothing generated, or the sentinel.
    pub fn is_fallback(&self) -> bool {
        self.generation
            .as_deref()
            .map_or(true, |g| g == NO_INFORMATION_ANSWER)
    }

    /// Caller-facing answer; an absent generation reads as the sentinel.
    pub fn final_answer(&self) -> &str {
        self.generation.as_deref().unwrap_or(NO_INFORMATION_ANSWER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_only_question() {
        let state = WorkingState::new("What is the capital of France?");
        assert_eq!(state.question(), "What is the capital of France?");
        assert!(state.documents().is_empty());
        assert!(state.generation().is_none());
    }

    #[test]
    fn test_absent_generation_reads_as_sentinel() {
        let state = WorkingState::new("q");
        assert!(state.is_fallback());
        assert_eq!(state.final_answer(), NO_INFORMATION_ANSWER);
    }

    #[test]
    fn test_real_generation_is_not_fallback() {
        let mut state = WorkingState::new("q");
        state.generation = Some("Paris.".to_string());
        assert!(!state.is_fallback());
        assert_eq!(state.final_answer(), "Paris.");

        state.generation = Some(NO_INFORMATION_ANSWER.to_string());
        assert!(state.is_fallback());
    }

    #[test]
    fn test_passage_identity_is_its_text() {
        assert_eq!(Passage::from("a"), Passage::new("a".to_string()));
        assert_ne!(Passage::from("a"), Passage::from("b"));
    }
}
