//! Scripted collaborators that record every call, for graph tests.

use super::collaborators::{
    AnswerGenerator, GroundednessJudge, GroundednessVerdict, RelevanceJudge, RelevanceVerdict,
    Retriever,
};
use super::state::Passage;
use crate::error::{GroundragError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub struct FixedRetriever {
    passages: Vec<Passage>,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl FixedRetriever {
    pub fn new(passages: &[&str]) -> Self {
        Self {
            passages: passages.iter().map(|p| Passage::from(*p)).collect(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for FixedRetriever {
    async fn search(&self, question: &str) -> Result<Vec<Passage>> {
        self.calls.lock().unwrap().push(question.to_string());
        if self.fail {
            return Err(GroundragError::Retrieval("store unavailable".to_string()));
        }
        Ok(self.passages.clone())
    }
}

/// Relevance verdicts keyed by passage text; unknown passages are irrelevant.
pub struct ScriptedRelevance {
    verdicts: HashMap<String, bool>,
    fail_on: Option<String>,
    stagger: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRelevance {
    pub fn by_passage(verdicts: &[(&str, bool)]) -> Self {
        Self {
            verdicts: verdicts.iter().map(|(p, v)| (p.to_string(), *v)).collect(),
            fail_on: None,
            stagger: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer with a malformed verdict for this passage.
    pub fn failing_on(mut self, passage: &str) -> Self {
        self.fail_on = Some(passage.to_string());
        self
    }

    /// Earlier calls take longer than later ones, so concurrent grading finishes out of order.
    pub fn staggered(mut self) -> Self {
        self.stagger = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelevanceJudge for ScriptedRelevance {
    async fn score(&self, _question: &str, passage: &str) -> Result<RelevanceVerdict> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(passage.to_string());
            calls.len() - 1
        };
        if self.stagger {
            tokio::time::sleep(Duration::from_millis(40 / (call_index as u64 + 1))).await;
        }
        if self.fail_on.as_deref() == Some(passage) {
            return Err(GroundragError::MalformedVerdict {
                judge: "relevance",
                raw: "{\"grade\": \"maybe\"}".to_string(),
            });
        }
        Ok(RelevanceVerdict {
            relevant: self.verdicts.get(passage).copied().unwrap_or(false),
        })
    }
}

pub struct ScriptedGenerator {
    answer: String,
    calls: Mutex<Vec<(String, Vec<Passage>)>>,
}

impl ScriptedGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Passage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerGenerator for ScriptedGenerator {
    async fn answer(&self, question: &str, passages: &[Passage]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), passages.to_vec()));
        Ok(self.answer.clone())
    }
}

pub struct ScriptedGroundedness {
    grounded: bool,
    fail: bool,
    calls: Mutex<Vec<(Vec<Passage>, String)>>,
}

impl ScriptedGroundedness {
    pub fn returning(grounded: bool) -> Self {
        Self {
            grounded,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(false)
        }
    }

    pub fn calls(&self) -> Vec<(Vec<Passage>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GroundednessJudge for ScriptedGroundedness {
    async fn score(&self, passages: &[Passage], answer: &str) -> Result<GroundednessVerdict> {
        self.calls
            .lock()
            .unwrap()
            .push((passages.to_vec(), answer.to_string()));
        if self.fail {
            return Err(GroundragError::Llm("connection refused".to_string()));
        }
        Ok(GroundednessVerdict {
            grounded: self.grounded,
        })
    }
}
