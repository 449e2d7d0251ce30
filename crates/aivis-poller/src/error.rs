use aivis_client::{ClientError, ErrorKind};
use thiserror::Error;

/// Failures surfaced by the polling controller.
///
/// `Validation` and `NoRuntime` are returned from `start`; the rest arrive
/// through the observer as [`crate::PollUpdate::Failed`].
#[derive(Debug, Error)]
pub enum PollError {
    /// The request is missing an entity id or a bearer token. Nothing was sent.
    #[error("invalid poll request: {0}")]
    Validation(String),

    #[error("poll sessions must be started from within a tokio runtime")]
    NoRuntime,

    #[error("analytics fetch failed: {0}")]
    Fetch(#[from] ClientError),

    /// The backend finished the analysis with status `failed`.
    #[error("backend reported the analysis as failed")]
    AnalysisFailed { reason: Option<String> },

    #[error("analysis still in progress after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

impl PollError {
    /// Client error class for fetch failures, so a front-end can tell an
    /// expired token from an outage.
    #[must_use]
    pub fn client_kind(&self) -> Option<ErrorKind> {
        match self {
            PollError::Fetch(e) => Some(e.kind()),
            _ => None,
        }
    }
}
