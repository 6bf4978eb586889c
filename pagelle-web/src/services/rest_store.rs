//! Remote vote store over the PostgREST table API
//!
//! Reads filter on `votante`/`amico_votato` plus `created_at=gt.T`; writes
//! upsert on the (votante, amico_votato, categoria) unique key.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use pagelle_common::config::StoreCredentials;
use pagelle_common::store::VoteStore;
use pagelle_common::{Rating, RatingUpsert};
use std::time::Duration;
use thiserror::Error;

use super::truncate_body;

const CONFLICT_COLUMNS: &str = "votante,amico_votato,categoria";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Remote store errors
#[derive(Debug, Error)]
pub enum RestStoreError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Store rejected request with status {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<RestStoreError> for pagelle_common::Error {
    fn from(err: RestStoreError) -> Self {
        pagelle_common::Error::Store(err.to_string())
    }
}

/// PostgREST-backed [`VoteStore`]
pub struct RestVoteStore {
    http_client: reqwest::Client,
    table_url: String,
    key: String,
}

impl RestVoteStore {
    pub fn new(
        credentials: &StoreCredentials,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, RestStoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RestStoreError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            table_url: format!(
                "{}/rest/v1/{}",
                credentials.url.trim_end_matches('/'),
                table
            ),
            key: credentials.key.clone(),
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    async fn select(
        &self,
        column: &str,
        value: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Rating>, RestStoreError> {
        let equals = format!("eq.{}", value);
        let after = format!("gt.{}", since.to_rfc3339_opts(SecondsFormat::Micros, true));

        tracing::debug!(column = %column, value = %value, since = %since, "Querying vote store");

        let response = self
            .authorized(self.http_client.get(&self.table_url))
            .query(&[
                ("select", "*"),
                (column, equals.as_str()),
                ("created_at", after.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RestStoreError::NetworkError(e.without_url().to_string()))?;

        let response = check_status(response).await?;

        let rows: Vec<Rating> = response
            .json()
            .await
            .map_err(|e| RestStoreError::ParseError(e.without_url().to_string()))?;

        tracing::debug!(column = %column, value = %value, rows = rows.len(), "Vote store query complete");
        Ok(rows)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RestStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = truncate_body(response.text().await.unwrap_or_default());
    Err(RestStoreError::ApiError(status.as_u16(), body))
}

#[async_trait]
impl VoteStore for RestVoteStore {
    fn backend_name(&self) -> &'static str {
        "rest"
    }

    async fn upsert(&self, rating: &RatingUpsert) -> pagelle_common::Result<()> {
        tracing::debug!(
            voter = %rating.voter,
            subject = %rating.subject,
            category = %rating.category,
            score = %rating.score,
            "Upserting rating"
        );

        let response = self
            .authorized(self.http_client.post(&self.table_url))
            .query(&[("on_conflict", CONFLICT_COLUMNS)])
            .header("Prefer", UPSERT_PREFER)
            .json(rating)
            .send()
            .await
            .map_err(|e| RestStoreError::NetworkError(e.without_url().to_string()))?;

        check_status(response).await?;
        Ok(())
    }

    async fn ratings_by_voter(
        &self,
        voter: &str,
        since: DateTime<Utc>,
    ) -> pagelle_common::Result<Vec<Rating>> {
        Ok(self.select("votante", voter, since).await?)
    }

    async fn ratings_for_subject(
        &self,
        subject: &str,
        since: DateTime<Utc>,
    ) -> pagelle_common::Result<Vec<Rating>> {
        Ok(self.select("amico_votato", subject, since).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_ignores_trailing_slash() {
        let store = RestVoteStore::new(
            &StoreCredentials {
                url: "https://party.supabase.co/".to_string(),
                key: "k".to_string(),
            },
            "voti",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(store.table_url, "https://party.supabase.co/rest/v1/voti");
    }

    #[test]
    fn test_store_error_becomes_common_store_error() {
        let err: pagelle_common::Error = RestStoreError::ApiError(401, "bad key".to_string()).into();
        assert!(matches!(err, pagelle_common::Error::Store(msg) if msg.contains("401")));
    }
}
