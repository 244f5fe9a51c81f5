//! Node actions: the only functions allowed to change a [`WorkingState`].

use super::collaborators::{AnswerGenerator, RelevanceJudge, Retriever};
use super::state::{Passage, WorkingState, NO_INFORMATION_ANSWER};
use crate::error::Result;
use futures_util::stream::{self, StreamExt, TryStreamExt};

/// Fill `documents` from the retriever. `question` is untouched, `generation` stays absent.
pub async fn retrieve(state: &mut WorkingState, retriever: &dyn Retriever) -> Result<()> {
    log::info!("retrieve: searching the knowledge store");
    state.documents = retriever.search(&state.question).await?;
    log::info!("retrieve: {} candidate passages", state.documents.len());
    Ok(())
}

/// Replace `documents` with the passages the judge calls relevant, keeping their order.
///
/// `concurrency` bounds how many judge calls are in flight; 1 grades strictly one
/// after another. The first judge error fails the whole step.
pub async fn grade_documents(
    state: &mut WorkingState,
    judge: &dyn RelevanceJudge,
    concurrency: usize,
) -> Result<()> {
    log::info!("grade_documents: checking relevance of {} passages", state.documents.len());

    let question = state.question.as_str();
    let verdicts: Vec<bool> = stream::iter(
        state
            .documents
            .iter()
            .map(|passage| judge.score(question, passage.content())),
    )
    .buffered(concurrency.max(1))
    .map_ok(|verdict| verdict.relevant)
    .try_collect()
    .await?;

    let graded = std::mem::take(&mut state.documents);
    state.documents = graded
        .into_iter()
        .zip(verdicts)
        .enumerate()
        .filter_map(|(idx, (passage, relevant))| {
            if relevant {
                log::debug!("grade_documents: passage {} relevant", idx);
                Some(passage)
            } else {
                log::debug!("grade_documents: passage {} not relevant", idx);
                None
            }
        })
        .collect::<Vec<Passage>>();

    log::info!("grade_documents: {} passages kept", state.documents.len());
    Ok(())
}

/// Produce `generation`. With no documents the sentinel is stored and the
/// generator is not called.
pub async fn generate(state: &mut WorkingState, generator: &dyn AnswerGenerator) -> Result<()> {
    if state.documents.is_empty() {
        log::info!("generate: no passages, answering with the fallback");
        state.generation = Some(NO_INFORMATION_ANSWER.to_string());
        return Ok(());
    }

    log::info!("generate: answering from {} passages", state.documents.len());
    let answer = generator.answer(&state.question, &state.documents).await?;
    state.generation = Some(answer);
    Ok(())
}

/// Overwrite whatever was generated with the sentinel and drop the passages it was built from.
pub fn set_no_info(state: &mut WorkingState) {
    log::info!("set_no_info: discarding unsupported answer");
    state.documents.clear();
    state.generation = Some(NO_INFORMATION_ANSWER.to_string());
}
