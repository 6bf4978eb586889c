//! Rating models and the fixed party roster
//!
//! Wire names follow the remote `voti` table: `votante`, `amico_votato`,
//! `categoria`, `punteggio`, `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::{Error, Result};

/// Lowest accepted score
pub const MIN_SCORE: u8 = 1;
/// Highest accepted score
pub const MAX_SCORE: u8 = 10;
/// Slider position before the voter touches it
pub const DEFAULT_SCORE: u8 = 5;

/// A single 1–10 score
///
/// Construction outside `MIN_SCORE..=MAX_SCORE` fails, so a `Score` held
/// anywhere in the crate is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidInput(format!(
                "score {} outside {}..={}",
                value, MIN_SCORE, MAX_SCORE
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Score {
    fn default() -> Self {
        Self(DEFAULT_SCORE)
    }
}

impl TryFrom<i64> for Score {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Score::new(value)
    }
}

impl From<Score> for i64 {
    fn from(score: Score) -> Self {
        i64::from(score.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rating row as held by the vote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    /// Free-text voter name (unauthenticated)
    #[serde(rename = "votante")]
    pub voter: String,
    /// Participant being rated
    #[serde(rename = "amico_votato")]
    pub subject: String,
    /// Rating dimension
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "punteggio")]
    pub score: Score,
    /// Set by the store on first insert
    #[serde(deserialize_with = "crate::time::deserialize_store_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Write payload for one rating; the store assigns `created_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingUpsert {
    #[serde(rename = "votante")]
    pub voter: String,
    #[serde(rename = "amico_votato")]
    pub subject: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "punteggio")]
    pub score: Score,
}

impl RatingUpsert {
    /// Uniqueness key: (voter, subject, category)
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.voter, &self.subject, &self.category)
    }
}

impl Rating {
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.voter, &self.subject, &self.category)
    }
}

/// Default participants of the party
pub const DEFAULT_PARTICIPANTS: [&str; 5] = ["Marco", "Giulia", "Alberto", "Elena", "Pietro"];

/// Default rating dimensions
pub const DEFAULT_CATEGORIES: [&str; 5] =
    ["Romantico", "Pazzo", "Puzzolente", "Simpatico", "Elegante"];

/// Fixed participant and category sets, configured at startup
///
/// Category order is significant: aggregation results and chart axes
/// follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    participants: Vec<String>,
    categories: Vec<String>,
}

impl Roster {
    /// Build a roster, rejecting empty sets, blank names and duplicates
    pub fn new(participants: Vec<String>, categories: Vec<String>) -> Result<Self> {
        validate_names("participant", &participants)?;
        validate_names("category", &categories)?;
        Ok(Self {
            participants,
            categories,
        })
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Ratings one voter must cast to finish: every participant in every category
    pub fn required_ratings(&self) -> usize {
        self.participants.len() * self.categories.len()
    }

    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.category_index(name).is_some()
    }

    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == name)
    }

    /// True when the rating names a participant and category of this roster
    pub fn covers(&self, rating: &Rating) -> bool {
        self.has_participant(&rating.subject) && self.has_category(&rating.category)
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            participants: DEFAULT_PARTICIPANTS.iter().map(|s| s.to_string()).collect(),
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn validate_names(kind: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(Error::Config(format!("at least one {} is required", kind)));
    }

    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(Error::Config(format!("blank {} name", kind)));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::Config(format!("duplicate {} '{}'", kind, name)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(0).is_err());
        assert_eq!(Score::new(1).unwrap().value(), 1);
        assert_eq!(Score::new(10).unwrap().value(), 10);
        assert!(Score::new(11).is_err());
        assert!(Score::new(-3).is_err());
    }

    #[test]
    fn test_score_default_is_slider_midpoint() {
        assert_eq!(Score::default().value(), DEFAULT_SCORE);
    }

    #[test]
    fn test_score_rejects_out_of_range_json() {
        let parsed: std::result::Result<Score, _> = serde_json::from_str("42");
        assert!(parsed.is_err());
        let parsed: Score = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.value(), 7);
    }

    #[test]
    fn test_rating_reads_store_row() {
        let row = r#"{
            "id": 12,
            "votante": "Ana",
            "amico_votato": "Marco",
            "categoria": "Pazzo",
            "punteggio": 8,
            "created_at": "2025-01-01T00:15:30.123456+00:00"
        }"#;

        let rating: Rating = serde_json::from_str(row).unwrap();
        assert_eq!(rating.key(), ("Ana", "Marco", "Pazzo"));
        assert_eq!(rating.score.value(), 8);
    }

    #[test]
    fn test_upsert_payload_uses_table_columns() {
        let upsert = RatingUpsert {
            voter: "Ana".to_string(),
            subject: "Marco".to_string(),
            category: "Pazzo".to_string(),
            score: Score::new(3).unwrap(),
        };

        let value = serde_json::to_value(&upsert).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "votante": "Ana",
                "amico_votato": "Marco",
                "categoria": "Pazzo",
                "punteggio": 3
            })
        );
    }

    #[test]
    fn test_default_roster_requires_25_ratings() {
        let roster = Roster::default();
        assert_eq!(roster.participants().len(), 5);
        assert_eq!(roster.categories()[0], "Romantico");
        assert_eq!(roster.required_ratings(), 25);
    }

    #[test]
    fn test_roster_rejects_duplicates_and_blanks() {
        assert!(Roster::new(names(&["Marco", "Marco"]), names(&["Pazzo"])).is_err());
        assert!(Roster::new(names(&["Marco"]), names(&[" "])).is_err());
        assert!(Roster::new(vec![], names(&["Pazzo"])).is_err());
    }

    #[test]
    fn test_category_index_follows_configured_order() {
        let roster = Roster::new(names(&["Marco"]), names(&["Romantico", "Pazzo"])).unwrap();
        assert_eq!(roster.category_index("Pazzo"), Some(1));
        assert_eq!(roster.category_index("Elegante"), None);
    }
}
