//! Results endpoint: the reveal view for one subject

use axum::{
    extract::{Query, State},
    Json,
};
use pagelle_common::voting::{reveal, RevealView};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Radial axis of the radar chart
pub const CHART_MIN: u8 = 0;
pub const CHART_MAX: u8 = 10;

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    #[serde(default)]
    pub voter: String,
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct ChartRange {
    pub min: u8,
    pub max: u8,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub view: RevealView,
    /// Present once unlocked; false when the window holds no ratings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_data: Option<bool>,
    pub chart: ChartRange,
}

/// GET /api/results?voter=V&subject=S
pub async fn get_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> ApiResult<Json<ResultsResponse>> {
    let view = reveal(&state.voting, &query.voter, &query.subject, state.clock.now()).await?;

    let has_data = match &view {
        RevealView::Locked { .. } => None,
        RevealView::Unlocked { results, .. } => Some(results.has_data()),
    };

    Ok(Json(ResultsResponse {
        view,
        has_data,
        chart: ChartRange {
            min: CHART_MIN,
            max: CHART_MAX,
        },
    }))
}
