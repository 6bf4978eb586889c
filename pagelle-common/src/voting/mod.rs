//! Voting core: session logic, aggregation and the reveal gate
//!
//! Every operation recomputes from the store; nothing is cached between
//! calls. Dependencies arrive through [`VotingContext`].

use chrono::Duration;
use std::sync::Arc;

use crate::models::Roster;
use crate::store::VoteStore;

pub mod aggregation;
pub mod reveal;
pub mod session;

pub use aggregation::{subject_means, CategoryMean, SubjectMeans};
pub use reveal::{evaluate_gate, reveal, GateState, RevealView};
pub use session::{completion_status, submit_ratings, Ballot, CompletionStatus, SubmitReceipt};

/// Default trailing window for counting and aggregating ratings
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Store, roster and window shared by the voting operations
#[derive(Clone)]
pub struct VotingContext {
    pub store: Arc<dyn VoteStore>,
    pub roster: Arc<Roster>,
    pub window: Duration,
}

impl VotingContext {
    pub fn new(store: Arc<dyn VoteStore>, roster: Roster, window: Duration) -> Self {
        Self {
            store,
            roster: Arc::new(roster),
            window,
        }
    }
}
