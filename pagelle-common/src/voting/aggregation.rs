//! Per-category averages for one subject

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::VotingContext;
use crate::models::{Rating, Roster};
use crate::time::window_start;
use crate::{Error, Result};

/// Mean score of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMean {
    pub category: String,
    /// 0.0 when the category has no observations
    pub mean: f64,
    pub observations: usize,
}

/// Averages for a subject, one entry per roster category in roster order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectMeans {
    pub subject: String,
    pub categories: Vec<CategoryMean>,
    pub total_ratings: usize,
}

impl SubjectMeans {
    /// False when the window held no ratings for the subject
    pub fn has_data(&self) -> bool {
        self.total_ratings > 0
    }

    pub fn mean_of(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.mean)
    }
}

/// Group ratings by roster category and average them
///
/// Ratings in categories the roster does not know are ignored.
pub fn mean_by_category(roster: &Roster, ratings: &[Rating]) -> Vec<CategoryMean> {
    let mut sums = vec![0u64; roster.categories().len()];
    let mut counts = vec![0usize; roster.categories().len()];

    for rating in ratings {
        if let Some(idx) = roster.category_index(&rating.category) {
            sums[idx] += u64::from(rating.score.value());
            counts[idx] += 1;
        }
    }

    roster
        .categories()
        .iter()
        .enumerate()
        .map(|(idx, category)| CategoryMean {
            category: category.clone(),
            mean: if counts[idx] == 0 {
                0.0
            } else {
                sums[idx] as f64 / counts[idx] as f64
            },
            observations: counts[idx],
        })
        .collect()
}

/// Average every category for `subject` over all voters in the window
pub async fn subject_means(
    ctx: &VotingContext,
    subject: &str,
    now: DateTime<Utc>,
) -> Result<SubjectMeans> {
    if !ctx.roster.has_participant(subject) {
        return Err(Error::InvalidInput(format!("unknown participant '{}'", subject)));
    }

    let since = window_start(now, ctx.window);
    let rows = ctx.store.ratings_for_subject(subject, since).await?;

    let categories = mean_by_category(&ctx.roster, &rows);
    let total_ratings = categories.iter().map(|c| c.observations).sum();

    Ok(SubjectMeans {
        subject: subject.to_string(),
        categories,
        total_ratings,
    })
}
