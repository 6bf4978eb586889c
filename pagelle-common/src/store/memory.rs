//! In-process vote store
//!
//! Mirrors the remote table's rules: one row per (voter, subject, category),
//! `created_at` assigned on first insert and kept when the row is
//! overwritten.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::VoteStore;
use crate::models::{Rating, RatingUpsert};
use crate::time::{Clock, SystemClock};
use crate::Result;

pub struct MemoryVoteStore {
    rows: Mutex<Vec<Rating>>,
    clock: Arc<dyn Clock>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Store stamping `created_at` from the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Copy of every stored row, expired or not
    pub async fn rows(&self) -> Vec<Rating> {
        self.rows.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    async fn select<F>(&self, since: DateTime<Utc>, filter: F) -> Vec<Rating>
    where
        F: Fn(&Rating) -> bool,
    {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|row| row.created_at > since && filter(row))
            .cloned()
            .collect()
    }
}

impl Default for MemoryVoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, rating: &RatingUpsert) -> Result<()> {
        let mut rows = self.rows.lock().await;

        if let Some(existing) = rows.iter_mut().find(|row| row.key() == rating.key()) {
            existing.score = rating.score;
            debug!(voter = %rating.voter, subject = %rating.subject, category = %rating.category, "Overwrote rating");
        } else {
            rows.push(Rating {
                voter: rating.voter.clone(),
                subject: rating.subject.clone(),
                category: rating.category.clone(),
                score: rating.score,
                created_at: self.clock.now(),
            });
            debug!(voter = %rating.voter, subject = %rating.subject, category = %rating.category, "Inserted rating");
        }

        Ok(())
    }

    async fn ratings_by_voter(&self, voter: &str, since: DateTime<Utc>) -> Result<Vec<Rating>> {
        Ok(self.select(since, |row| row.voter == voter).await)
    }

    async fn ratings_for_subject(
        &self,
        subject: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Rating>> {
        Ok(self.select(since, |row| row.subject == subject).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Score;
    use crate::time::ManualClock;
    use chrono::{Duration, TimeZone};

    fn upsert(voter: &str, subject: &str, category: &str, score: i64) -> RatingUpsert {
        RatingUpsert {
            voter: voter.to_string(),
            subject: subject.to_string(),
            category: category.to_string(),
            score: Score::new(score).unwrap(),
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 31, 21, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_triple() {
        let store = MemoryVoteStore::with_clock(Arc::new(ManualClock::new(start())));

        store.upsert(&upsert("Ana", "Marco", "Pazzo", 4)).await.unwrap();
        store.upsert(&upsert("Ana", "Marco", "Pazzo", 9)).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score.value(), 9);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_original_created_at() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = MemoryVoteStore::with_clock(clock.clone());

        store.upsert(&upsert("Ana", "Marco", "Pazzo", 4)).await.unwrap();
        clock.advance(Duration::hours(3));
        store.upsert(&upsert("Ana", "Marco", "Pazzo", 6)).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows[0].created_at, start());
    }

    #[tokio::test]
    async fn test_since_bound_is_exclusive() {
        let store = MemoryVoteStore::with_clock(Arc::new(ManualClock::new(start())));
        store.upsert(&upsert("Ana", "Marco", "Pazzo", 4)).await.unwrap();

        let at_bound = store.ratings_by_voter("Ana", start()).await.unwrap();
        assert!(at_bound.is_empty());

        let before = store
            .ratings_by_voter("Ana", start() - Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(before.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_by_voter_and_subject() {
        let store = MemoryVoteStore::with_clock(Arc::new(ManualClock::new(start())));
        store.upsert(&upsert("Ana", "Marco", "Pazzo", 4)).await.unwrap();
        store.upsert(&upsert("Ana", "Giulia", "Pazzo", 5)).await.unwrap();
        store.upsert(&upsert("Bob", "Marco", "Pazzo", 6)).await.unwrap();

        let since = start() - Duration::hours(1);
        assert_eq!(store.ratings_by_voter("Ana", since).await.unwrap().len(), 2);
        assert_eq!(store.ratings_for_subject("Marco", since).await.unwrap().len(), 2);
        assert!(store.ratings_by_voter("ana", since).await.unwrap().is_empty());
    }
}
