//! pagelle-web library - party voting web service
//!
//! Serves the voting page and the JSON API over the voting core in
//! `pagelle-common`.

use axum::Router;
use pagelle_common::generation::TextGenerator;
use pagelle_common::time::Clock;
use pagelle_common::voting::VotingContext;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Store, roster and window
    pub voting: VotingContext,
    /// Hosted model; `None` disables AI commentary
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub prompt_template: String,
    /// Page title
    pub title: String,
    pub clock: Arc<dyn Clock>,
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        voting: VotingContext,
        generator: Option<Arc<dyn TextGenerator>>,
        prompt_template: String,
        title: String,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            voting,
            generator,
            prompt_template,
            title,
            clock,
            startup_time: Instant::now(),
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.generator.is_some()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/roster", get(api::get_roster))
        .route("/api/progress", get(api::get_progress))
        .route("/api/votes", post(api::submit_votes))
        .route("/api/results", get(api::get_results))
        .route("/api/commentary", post(api::request_commentary));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/app.css", get(api::serve_app_css))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
