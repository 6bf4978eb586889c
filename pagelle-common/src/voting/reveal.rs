//! Reveal gate
//!
//! LOCKED until the voter's completion status reports complete. The state is
//! re-evaluated on every call and never remembered, so a voter whose
//! ratings age out of the window is locked again.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::aggregation::{subject_means, SubjectMeans};
use super::session::{completion_status, CompletionStatus};
use super::VotingContext;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    #[default]
    Locked,
    Unlocked,
}

impl GateState {
    pub fn from_status(status: &CompletionStatus) -> Self {
        if status.complete {
            GateState::Unlocked
        } else {
            GateState::Locked
        }
    }

    pub fn is_unlocked(self) -> bool {
        self == GateState::Unlocked
    }
}

/// What the results section may show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "gate", rename_all = "lowercase")]
pub enum RevealView {
    /// Only the progress indicator
    Locked { progress: CompletionStatus },
    /// Progress plus the subject's averages
    Unlocked {
        progress: CompletionStatus,
        results: SubjectMeans,
    },
}

impl RevealView {
    pub fn gate(&self) -> GateState {
        match self {
            RevealView::Locked { .. } => GateState::Locked,
            RevealView::Unlocked { .. } => GateState::Unlocked,
        }
    }

    pub fn progress(&self) -> &CompletionStatus {
        match self {
            RevealView::Locked { progress } | RevealView::Unlocked { progress, .. } => progress,
        }
    }
}

/// Evaluate the gate for `voter` at `now`
pub async fn evaluate_gate(
    ctx: &VotingContext,
    voter: &str,
    now: DateTime<Utc>,
) -> Result<(GateState, CompletionStatus)> {
    let status = completion_status(ctx, voter, now).await?;
    let gate = GateState::from_status(&status);
    debug!(voter = %voter.trim(), count = status.count, required = status.required, ?gate, "Gate evaluated");
    Ok((gate, status))
}

/// Results view for `subject` as seen by `voter`
///
/// Aggregation only runs once the gate is open.
pub async fn reveal(
    ctx: &VotingContext,
    voter: &str,
    subject: &str,
    now: DateTime<Utc>,
) -> Result<RevealView> {
    let (gate, progress) = evaluate_gate(ctx, voter, now).await?;

    if !gate.is_unlocked() {
        return Ok(RevealView::Locked { progress });
    }

    let results = subject_means(ctx, subject, now).await?;
    Ok(RevealView::Unlocked { progress, results })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gate_is_locked() {
        assert_eq!(GateState::default(), GateState::Locked);
    }

    #[test]
    fn test_gate_follows_completion() {
        assert_eq!(
            GateState::from_status(&CompletionStatus::new(3, 4)),
            GateState::Locked
        );
        assert_eq!(
            GateState::from_status(&CompletionStatus::new(4, 4)),
            GateState::Unlocked
        );
    }

    #[test]
    fn test_locked_view_serializes_progress_only() {
        let view = RevealView::Locked {
            progress: CompletionStatus::new(2, 4),
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["gate"], "locked");
        assert_eq!(value["progress"]["count"], 2);
        assert_eq!(value["progress"]["required"], 4);
        assert!(value.get("results").is_none());
    }
}
