//! HTTP API handlers for pagelle-web

pub mod buildinfo;
pub mod commentary;
pub mod health;
pub mod results;
pub mod roster;
pub mod ui;
pub mod votes;

pub use buildinfo::get_build_info;
pub use commentary::request_commentary;
pub use health::health_routes;
pub use results::get_results;
pub use roster::get_roster;
pub use ui::{serve_app_css, serve_app_js, serve_index};
pub use votes::{get_progress, submit_votes};
