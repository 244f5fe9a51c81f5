//! Prompt templates for the graders and the answer generator.

use super::client::ChatMessage;
use crate::workflow::Passage;

const RELEVANCE_SYSTEM: &str = "You are a grader assessing relevance of a retrieved document to a user question.\n\
If the document contains keywords or meaning related to the user question, grade it as relevant.\n\
It does not need to be a stringent test. The goal is to filter out erroneous retrievals.\n\
The document and question may be in any language; judge them semantically.\n\
Give a binary score 'yes' or 'no' to indicate whether the document is relevant to the question.\n\
Provide the binary score as a JSON object with a single key 'score' and no preamble or explanation.";

const GENERATION_SYSTEM: &str = "You are an assistant for question-answering tasks. \
Use the following pieces of retrieved context to answer the question.\n\
If you don't know the answer, just say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\
Answer in the language of the question.";

const GROUNDEDNESS_SYSTEM: &str = "You are a grader assessing whether an answer is grounded in / supported by a set of facts.\n\
Give a binary score 'yes' or 'no' to indicate whether the answer is grounded in / supported by the facts.\n\
The text may be in any language.\n\
Provide the binary score as a JSON object with a single key 'score' and no preamble or explanation.";

/// Passages joined by blank lines, in the order given.
pub fn join_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(Passage::content)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn relevance(question: &str, passage: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(RELEVANCE_SYSTEM),
        ChatMessage::user(format!(
            "Here is the retrieved document:\n\n{}\n\nHere is the user question: {}",
            passage,
            question
        )),
    ]
}

pub fn generation(question: &str, passages: &[Passage]) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GENERATION_SYSTEM),
        ChatMessage::user(format!(
            "Question: {}\nContext: {}\nAnswer:",
            question,
            join_passages(passages)
        )),
    ]
}

pub fn groundedness(passages: &[Passage], answer: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(GROUNDEDNESS_SYSTEM),
        ChatMessage::user(format!(
            "Here are the facts:\n\n{}\n\nHere is the answer: {}",
            join_passages(passages),
            answer
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_passages_blank_line_separated() {
        let passages = vec![Passage::from("one"), Passage::from("two")];
        assert_eq!(join_passages(&passages), "one\n\ntwo");
        assert_eq!(join_passages(&[]), "");
    }

    #[test]
    fn test_relevance_prompt_carries_inputs() {
        let messages = relevance("Where is Paris?", "Paris is in France");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("'score'"));
        assert!(messages[1].content.contains("Paris is in France"));
        assert!(messages[1].content.contains("Where is Paris?"));
    }

    #[test]
    fn test_generation_prompt_keeps_passage_order() {
        let passages = vec![Passage::from("first fact"), Passage::from("second fact")];
        let messages = generation("q?", &passages);
        let user = &messages[1].content;
        let first = user.find("first fact").unwrap();
        let second = user.find("second fact").unwrap();
        assert!(first < second);
        assert!(messages[0].content.contains("three sentences"));
    }

    #[test]
    fn test_groundedness_prompt_carries_answer() {
        let messages = groundedness(&[Passage::from("fact")], "claim");
        assert!(messages[1].content.contains("fact"));
        assert!(messages[1].content.ends_with("Here is the answer: claim"));
    }
}
