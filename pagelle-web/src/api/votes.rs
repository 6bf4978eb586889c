//! Vote submission and progress endpoints

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use pagelle_common::voting::{
    evaluate_gate, submit_ratings, Ballot, CompletionStatus, GateState,
};
use pagelle_common::Score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(default)]
    pub voter: String,
}

/// Voter progress plus the gate it implies
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub count: usize,
    pub required: usize,
    pub complete: bool,
    pub remaining: usize,
    pub gate: GateState,
}

impl ProgressResponse {
    fn new(status: CompletionStatus, gate: GateState) -> Self {
        Self {
            count: status.count,
            required: status.required,
            complete: status.complete,
            remaining: status.remaining(),
            gate,
        }
    }
}

/// POST /api/votes body
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub voter: String,
    pub subject: String,
    /// category → score; ranges are checked here
    pub scores: BTreeMap<String, i64>,
}

impl VoteRequest {
    fn into_ballot(self) -> pagelle_common::Result<Ballot> {
        let scores = self
            .scores
            .into_iter()
            .map(|(category, raw)| Ok((category, Score::new(raw)?)))
            .collect::<pagelle_common::Result<BTreeMap<_, _>>>()?;

        Ok(Ballot {
            voter: self.voter,
            subject: self.subject,
            scores,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub written: usize,
    pub progress: ProgressResponse,
}

/// GET /api/progress?voter=V
pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<Json<ProgressResponse>> {
    let (gate, status) = evaluate_gate(&state.voting, &query.voter, state.clock.now()).await?;
    Ok(Json(ProgressResponse::new(status, gate)))
}

/// POST /api/votes
///
/// Writes the ballot, then recomputes progress from the store.
pub async fn submit_votes(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteResponse>> {
    let Json(request) = payload?;
    let ballot = request.into_ballot()?;
    let receipt = submit_ratings(&state.voting, &ballot).await?;

    let (gate, status) = evaluate_gate(&state.voting, &ballot.voter, state.clock.now()).await?;

    Ok(Json(VoteResponse {
        written: receipt.written,
        progress: ProgressResponse::new(status, gate),
    }))
}
