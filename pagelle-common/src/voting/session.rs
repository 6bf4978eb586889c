//! Voting session logic
//!
//! Identity is the free-text voter name. It is trimmed and otherwise used
//! as-is as part of the store's conflict key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::VotingContext;
use crate::models::{RatingUpsert, Score};
use crate::time::window_start;
use crate::{Error, Result};

/// One form submission: scores for a single subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub voter: String,
    pub subject: String,
    pub scores: BTreeMap<String, Score>,
}

/// Outcome of a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub written: usize,
}

/// Progress of one voter towards the full set of ratings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionStatus {
    pub count: usize,
    pub required: usize,
    pub complete: bool,
}

impl CompletionStatus {
    pub fn new(count: usize, required: usize) -> Self {
        Self {
            count,
            required,
            complete: count >= required,
        }
    }

    pub fn remaining(&self) -> usize {
        self.required.saturating_sub(self.count)
    }
}

/// Normalize a voter name; blank names are rejected
pub fn normalize_voter(voter: &str) -> Result<String> {
    let trimmed = voter.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("voter name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Persist every score of the ballot, one upsert per category
///
/// Writes go out in roster category order. There is no transaction: a
/// failing write stops the loop and earlier writes stay in place.
pub async fn submit_ratings(ctx: &VotingContext, ballot: &Ballot) -> Result<SubmitReceipt> {
    let voter = normalize_voter(&ballot.voter)?;

    if !ctx.roster.has_participant(&ballot.subject) {
        return Err(Error::InvalidInput(format!(
            "unknown participant '{}'",
            ballot.subject
        )));
    }
    if ballot.scores.is_empty() {
        return Err(Error::InvalidInput("no scores submitted".to_string()));
    }
    if let Some(unknown) = ballot.scores.keys().find(|c| !ctx.roster.has_category(c)) {
        return Err(Error::InvalidInput(format!("unknown category '{}'", unknown)));
    }

    let total = ballot.scores.len();
    let mut written = 0;

    for category in ctx.roster.categories() {
        let Some(score) = ballot.scores.get(category) else {
            continue;
        };

        let rating = RatingUpsert {
            voter: voter.clone(),
            subject: ballot.subject.clone(),
            category: category.clone(),
            score: *score,
        };

        if let Err(e) = ctx.store.upsert(&rating).await {
            warn!(
                voter = %voter,
                subject = %ballot.subject,
                written,
                total,
                "Rating submission interrupted: {}",
                e
            );
            return Err(Error::Store(format!(
                "saved {} of {} ratings before failure: {}",
                written, total, e
            )));
        }
        written += 1;
    }

    info!(voter = %voter, subject = %ballot.subject, written, "Ratings saved");
    Ok(SubmitReceipt { written })
}

/// Count the voter's ratings inside the trailing window
///
/// Counts rows, which equals distinct triples because the store keeps one
/// row per (voter, subject, category). Rows outside the roster are skipped.
pub async fn completion_status(
    ctx: &VotingContext,
    voter: &str,
    now: DateTime<Utc>,
) -> Result<CompletionStatus> {
    let voter = normalize_voter(voter)?;
    let since = window_start(now, ctx.window);

    let rows = ctx.store.ratings_by_voter(&voter, since).await?;
    let count = rows.iter().filter(|row| ctx.roster.covers(row)).count();

    Ok(CompletionStatus::new(count, ctx.roster.required_ratings()))
}
