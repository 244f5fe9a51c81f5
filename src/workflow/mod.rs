//! Self-correcting answer graph: retrieve → grade → generate → verify.

pub mod collaborators;
pub mod graph;
pub mod nodes;
pub mod routing;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{
    AnswerGenerator, GroundednessJudge, GroundednessVerdict, RelevanceJudge, RelevanceVerdict,
    Retriever,
};
pub use graph::{Interaction, Node, Outcome, Pipeline, Termination};
pub use routing::{GenerateDecision, GroundednessDecision};
pub use state::{Passage, WorkingState, NO_INFORMATION_ANSWER};
