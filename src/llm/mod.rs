//! Chat-model backed graders and answer generator.

pub mod client;
pub mod graders;
pub mod prompts;
pub mod verdict;

pub use client::{ChatClient, ChatMessage};
pub use graders::{LlmAnswerGenerator, LlmGroundednessJudge, LlmRelevanceJudge};
pub use verdict::parse_binary_score;
