//! # Pagelle Common Library
//!
//! Shared code for the Pagelle party voting service including:
//! - Rating, score and roster models
//! - The vote store seam and an in-process store
//! - Voting session, aggregation and reveal gate logic
//! - Text generation seam and commentary prompt
//! - Configuration loading and secret resolution

pub mod config;
pub mod error;
pub mod generation;
pub mod models;
pub mod store;
pub mod time;
pub mod voting;

pub use error::{Error, Result};
pub use models::{Rating, RatingUpsert, Roster, Score};
