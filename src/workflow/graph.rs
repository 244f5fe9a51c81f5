//! The answer graph as an explicit state machine.
//!
//! ```text
//! retrieve -> grade_documents -+-> generate -+-> END (grounded / trusted)
//!                              |             +-> set_no_info -> END (reset)
//!                              +-> END (no context)
//! ```

use super::collaborators::{AnswerGenerator, GroundednessJudge, RelevanceJudge, Retriever};
use super::nodes;
use super::routing::{self, GenerateDecision, GroundednessDecision};
use super::state::{WorkingState, NO_INFORMATION_ANSWER};
use crate::error::{GroundragError, Result};

/// Graph nodes, in the order they can first be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Retrieve,
    GradeDocuments,
    Generate,
    SetNoInfo,
}

impl Node {
    pub fn name(self) -> &'static str {
        match self {
            Node::Retrieve => "retrieve",
            Node::GradeDocuments => "grade_documents",
            Node::Generate => "generate",
            Node::SetNoInfo => "set_no_info",
        }
    }
}

/// Which of the END edges the interaction took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// No passage survived relevance grading.
    NoContext,
    /// The generator answered with the sentinel itself; accepted without verification.
    Trusted,
    /// The generated answer passed the groundedness check.
    Grounded,
    /// The generated answer failed the check and was replaced by the sentinel.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Goto(Node),
    End(Termination),
}

/// What a caller can observe: a verified answer, or the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answer(String),
    NoInformation,
}

impl Outcome {
    fn from_state(state: &WorkingState) -> Self {
        if state.is_fallback() {
            Outcome::NoInformation
        } else {
            Outcome::Answer(state.final_answer().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Answer(answer) => answer,
            Outcome::NoInformation => NO_INFORMATION_ANSWER,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::NoInformation)
    }

    pub fn into_string(self) -> String {
        match self {
            Outcome::Answer(answer) => answer,
            Outcome::NoInformation => NO_INFORMATION_ANSWER.to_string(),
        }
    }
}

/// Result of one full traversal. Discarded generations are not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub outcome: Outcome,
    pub termination: Termination,
    /// Nodes executed, in order.
    pub trace: Vec<Node>,
}

/// Entry point of the answer graph. Holds no per-question state, so one
/// pipeline can serve any number of questions one after another.
pub struct Pipeline<'a> {
    retriever: &'a dyn Retriever,
    relevance: &'a dyn RelevanceJudge,
    generator: &'a dyn AnswerGenerator,
    groundedness: &'a dyn GroundednessJudge,
    relevance_concurrency: usize,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        retriever: &'a dyn Retriever,
        relevance: &'a dyn RelevanceJudge,
        generator: &'a dyn AnswerGenerator,
        groundedness: &'a dyn GroundednessJudge,
    ) -> Self {
        Self {
            retriever,
            relevance,
            generator,
            groundedness,
            relevance_concurrency: 1,
        }
    }

    /// Allow up to `concurrency` relevance grading calls at once (order is still preserved).
    pub fn with_relevance_concurrency(mut self, concurrency: usize) -> Self {
        self.relevance_concurrency = concurrency.max(1);
        self
    }

    /// Answer a question: the grounded answer, or [`NO_INFORMATION_ANSWER`].
    pub async fn ask(&self, question: &str) -> Result<String> {
        Ok(self.run(question).await?.outcome.into_string())
    }

    /// Run the graph from `retrieve` to END for one question.
    pub async fn run(&self, question: &str) -> Result<Interaction> {
        if question.trim().is_empty() {
            return Err(GroundragError::InvalidInput("question must not be empty".to_string()));
        }

        let mut state = WorkingState::new(question);
        let mut trace = Vec::new();
        let mut node = Node::Retrieve;

        let termination = loop {
            trace.push(node);
            match self.step(node, &mut state).await? {
                Transition::Goto(next) => node = next,
                Transition::End(termination) => break termination,
            }
        };

        log::info!(
            "graph finished via {:?} after {}",
            termination,
            trace.iter().map(|n| n.name()).collect::<Vec<_>>().join(" -> ")
        );

        Ok(Interaction {
            outcome: Outcome::from_state(&state),
            termination,
            trace,
        })
    }

    /// Run one node's action, then evaluate its outgoing edge.
    async fn step(&self, node: Node, state: &mut WorkingState) -> Result<Transition> {
        match node {
            Node::Retrieve => {
                nodes::retrieve(state, self.retriever).await?;
                Ok(Transition::Goto(Node::GradeDocuments))
            }
            Node::GradeDocuments => {
                nodes::grade_documents(state, self.relevance, self.relevance_concurrency).await?;
                Ok(match routing::decide_to_generate(state) {
                    GenerateDecision::Generate => Transition::Goto(Node::Generate),
                    GenerateDecision::NoContext => Transition::End(Termination::NoContext),
                })
            }
            Node::Generate => {
                nodes::generate(state, self.generator).await?;
                Ok(match routing::check_groundedness(state, self.groundedness).await? {
                    GroundednessDecision::Trusted => Transition::End(Termination::Trusted),
                    GroundednessDecision::Grounded => Transition::End(Termination::Grounded),
                    GroundednessDecision::NotSupported => Transition::Goto(Node::SetNoInfo),
                })
            }
            Node::SetNoInfo => {
                nodes::set_no_info(state);
                Ok(Transition::End(Termination::Reset))
            }
        }
    }
}
