//! Vote store seam
//!
//! The remote table store is an external collaborator. Everything in the
//! voting core reaches it through [`VoteStore`], so tests and the dev mode
//! can swap in [`MemoryVoteStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Rating, RatingUpsert};
use crate::Result;

mod memory;
pub use memory::MemoryVoteStore;

/// Table-backed rating persistence
///
/// `since` bounds are exclusive: only rows with `created_at > since` are
/// returned.
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Short backend label for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Insert or overwrite the rating keyed on (voter, subject, category)
    async fn upsert(&self, rating: &RatingUpsert) -> Result<()>;

    /// Ratings cast by `voter` after `since`
    async fn ratings_by_voter(&self, voter: &str, since: DateTime<Utc>) -> Result<Vec<Rating>>;

    /// Ratings received by `subject` from any voter after `since`
    async fn ratings_for_subject(
        &self,
        subject: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Rating>>;
}
