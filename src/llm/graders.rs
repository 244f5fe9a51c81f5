use super::client::ChatClient;
use super::prompts;
use super::verdict::parse_binary_score;
use crate::error::Result;
use crate::workflow::{
    AnswerGenerator, GroundednessJudge, GroundednessVerdict, Passage, RelevanceJudge,
    RelevanceVerdict,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Relevance grader backed by the chat model
pub struct LlmRelevanceJudge {
    chat: Arc<ChatClient>,
}

impl LlmRelevanceJudge {
    pub fn new(chat: Arc<ChatClient>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl RelevanceJudge for LlmRelevanceJudge {
    async fn score(&self, question: &str, passage: &str) -> Result<RelevanceVerdict> {
        let raw = self.chat.complete(&prompts::relevance(question, passage)).await?;
        let relevant = parse_binary_score("relevance", &raw)?;
        Ok(RelevanceVerdict { relevant })
    }
}

/// Answer generator backed by the chat model
pub struct LlmAnswerGenerator {
    chat: Arc<ChatClient>,
}

impl LlmAnswerGenerator {
    pub fn new(chat: Arc<ChatClient>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn answer(&self, question: &str, passages: &[Passage]) -> Result<String> {
        // stored verbatim; no trimming or post-processing
        self.chat.complete(&prompts::generation(question, passages)).await
    }
}

/// Hallucination grader backed by the chat model
pub struct LlmGroundednessJudge {
    chat: Arc<ChatClient>,
}

impl LlmGroundednessJudge {
    pub fn new(chat: Arc<ChatClient>) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl GroundednessJudge for LlmGroundednessJudge {
    async fn score(&self, passages: &[Passage], answer: &str) -> Result<GroundednessVerdict> {
        let raw = self
            .chat
            .complete(&prompts::groundedness(passages, answer))
            .await?;
        let grounded = parse_binary_score("groundedness", &raw)?;
        Ok(GroundednessVerdict { grounded })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GroundragError;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    fn chat(server: &MockServer) -> Arc<ChatClient> {
        Arc::new(
            ChatClient::new(
                format!("{}/v1", server.uri()),
                "llama3.1",
                None,
                0.0,
                Duration::from_secs(5),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_relevance_judge_parses_yes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("Paris is the capital of France"))
            .respond_with(reply("```json\n{\"score\": \"yes\"}\n```"))
            .expect(1)
            .mount(&server)
            .await;

        let judge = LlmRelevanceJudge::new(chat(&server));
        let verdict = judge
            .score("What is the capital of France?", "Paris is the capital of France")
            .await
            .unwrap();
        assert!(verdict.relevant);
    }

    #[tokio::test]
    async fn test_relevance_judge_malformed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("I think it is relevant."))
            .mount(&server)
            .await;

        let judge = LlmRelevanceJudge::new(chat(&server));
        let err = judge.score("q", "p").await.unwrap_err();
        assert!(matches!(
            err,
            GroundragError::MalformedVerdict { judge: "relevance", .. }
        ));
    }

    #[tokio::test]
    async fn test_generator_returns_reply_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Question: What is the capital of France?"))
            .respond_with(reply("  The capital of France is Paris.\n"))
            .mount(&server)
            .await;

        let generator = LlmAnswerGenerator::new(chat(&server));
        let answer = generator
            .answer(
                "What is the capital of France?",
                &[Passage::from("Paris is the capital of France")],
            )
            .await
            .unwrap();
        assert_eq!(answer, "  The capital of France is Paris.\n");
    }

    #[tokio::test]
    async fn test_groundedness_judge_parses_no() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Here is the answer: Lyon"))
            .respond_with(reply("{\"score\": \"no\"}"))
            .mount(&server)
            .await;

        let judge = LlmGroundednessJudge::new(chat(&server));
        let verdict = judge
            .score(&[Passage::from("Paris is the capital of France")], "Lyon")
            .await
            .unwrap();
        assert!(!verdict.grounded);
    }

    #[tokio::test]
    async fn test_upstream_fault_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let judge = LlmGroundednessJudge::new(chat(&server));
        let err = judge.score(&[Passage::from("x")], "y").await.unwrap_err();
        assert!(matches!(err, GroundragError::Llm(_)));
    }
}
