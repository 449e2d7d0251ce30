//! The fetch seam the controller depends on.

use aivis_client::{AnalyticsClient, AnalyticsEnvelope, ClientError, EntityRef};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Anything that can fetch one analytics record.
///
/// [`AnalyticsClient`] is the production implementation; tests script their
/// own responses.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch_analytics(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError>;
}

#[async_trait]
impl AnalyticsSource for AnalyticsClient {
    async fn fetch_analytics(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        self.get_analytics(entity, date, token).await
    }
}
