use aivis_client::{AnalysisStatus, AnalyticsView};

use crate::error::PollError;

/// One observer callback.
///
/// `attempt` is 0-based and never decreases within a session. A backend
/// `failed` status produces a `Snapshot` followed by a `Failed` for the same
/// attempt.
#[derive(Debug)]
pub enum PollUpdate {
    Snapshot { attempt: u32, view: AnalyticsView },
    Failed { attempt: u32, error: PollError },
}

impl PollUpdate {
    #[must_use]
    pub fn attempt(&self) -> u32 {
        match self {
            PollUpdate::Snapshot { attempt, .. } | PollUpdate::Failed { attempt, .. } => *attempt,
        }
    }

    /// `true` for the last update a session delivers.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            PollUpdate::Snapshot { view, .. } => view.status == AnalysisStatus::Completed,
            PollUpdate::Failed { .. } => true,
        }
    }
}
