use aivis_client::EntityRef;
use aivis_core::AuthSession;
use chrono::{NaiveDate, Utc};

use crate::error::PollError;

/// What to poll: one entity's analytics for one day, fetched with `session`.
#[derive(Debug, Clone)]
pub struct AnalyticsRequest {
    pub entity: EntityRef,
    pub date: NaiveDate,
    pub session: AuthSession,
}

impl AnalyticsRequest {
    #[must_use]
    pub fn new(entity: EntityRef, date: NaiveDate, session: AuthSession) -> Self {
        Self {
            entity,
            date,
            session,
        }
    }

    /// Request for the current UTC day.
    #[must_use]
    pub fn for_today(entity: EntityRef, session: AuthSession) -> Self {
        Self::new(entity, Utc::now().date_naive(), session)
    }

    /// Checks that the request can be sent at all.
    ///
    /// # Errors
    ///
    /// [`PollError::Validation`] for a blank entity id or a blank token.
    pub fn validate(&self) -> Result<(), PollError> {
        if self.entity.id().trim().is_empty() {
            return Err(PollError::Validation("entity id is empty".to_owned()));
        }
        if !self.session.is_authenticated() {
            return Err(PollError::Validation("access token is empty".to_owned()));
        }
        Ok(())
    }
}
