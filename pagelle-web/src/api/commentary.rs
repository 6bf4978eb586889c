//! AI commentary endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use pagelle_common::generation::{self, CommentaryOutcome};
use pagelle_common::voting::{reveal, RevealView};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentaryRequest {
    pub voter: String,
    pub subject: String,
}

/// POST /api/commentary
///
/// Only for voters past the gate. Generator failures come back as
/// `outcome: failed` with status 200.
pub async fn request_commentary(
    State(state): State<AppState>,
    payload: Result<Json<CommentaryRequest>, JsonRejection>,
) -> ApiResult<Json<CommentaryOutcome>> {
    let Json(request) = payload?;
    let view = reveal(
        &state.voting,
        &request.voter,
        &request.subject,
        state.clock.now(),
    )
    .await?;

    let results = match view {
        RevealView::Unlocked { results, .. } => results,
        RevealView::Locked { progress } => {
            return Err(ApiError::Locked(format!(
                "rate everyone first: {} of {} ratings",
                progress.count, progress.required
            )));
        }
    };

    let outcome = generation::request_commentary(
        state.generator.as_deref(),
        &state.prompt_template,
        &results,
    )
    .await;

    Ok(Json(outcome))
}
