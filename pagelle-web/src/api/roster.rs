//! Roster endpoint: everything the page needs to draw the form

use axum::{extract::State, Json};
use pagelle_common::models::{DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub title: String,
    pub participants: Vec<String>,
    pub categories: Vec<String>,
    pub score: ScoreRange,
    pub window_hours: i64,
    pub ai_enabled: bool,
}

/// GET /api/roster
pub async fn get_roster(State(state): State<AppState>) -> Json<RosterResponse> {
    let roster = &state.voting.roster;

    Json(RosterResponse {
        title: state.title.clone(),
        participants: roster.participants().to_vec(),
        categories: roster.categories().to_vec(),
        score: ScoreRange {
            min: MIN_SCORE,
            max: MAX_SCORE,
            default: DEFAULT_SCORE,
        },
        window_hours: state.voting.window.num_hours(),
        ai_enabled: state.ai_enabled(),
    })
}
