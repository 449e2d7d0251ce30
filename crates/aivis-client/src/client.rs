//! HTTP client for the visibility-analytics REST API.
//!
//! Wraps `reqwest` with bearer-token handling, status-to-error mapping and
//! lenient envelope decoding. Auth and product endpoints live in
//! [`crate::auth`] and [`crate::products`] as further `impl` blocks.

use std::time::Duration;

use aivis_core::AppConfig;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::types::AnalyticsEnvelope;

const DEFAULT_USER_AGENT: &str = "aivis/0.1 (visibility-analytics)";

/// The entity whose analytics are requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Product(String),
    Keyword(String),
}

impl EntityRef {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            EntityRef::Product(id) | EntityRef::Keyword(id) => id,
        }
    }

    /// Path segment used by the analytics endpoints.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            EntityRef::Product(_) => "products",
            EntityRef::Keyword(_) => "keywords",
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Product(id) => write!(f, "product:{id}"),
            EntityRef::Keyword(id) => write!(f, "keyword:{id}"),
        }
    }
}

/// Client for the analytics backend.
///
/// Use [`AnalyticsClient::from_config`] in binaries or
/// [`AnalyticsClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct AnalyticsClient {
    pub(crate) client: Client,
    base_url: Url,
}

impl AnalyticsClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::build(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL and the default user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute `http(s)` URL.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        Self::build(base_url, timeout_secs, DEFAULT_USER_AGENT)
    }

    fn build(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so endpoint segments are
        // appended below any path prefix instead of replacing it.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_string(),
                reason: "scheme must be http or https".to_owned(),
            });
        }

        Ok(Self { client, base_url })
    }

    /// Fetches the analytics record for a product on `date`.
    ///
    /// # Errors
    ///
    /// See [`AnalyticsClient::get_analytics`].
    pub async fn get_product_analytics(
        &self,
        product_id: &str,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        self.get_analytics(&EntityRef::Product(product_id.to_owned()), date, token)
            .await
    }

    /// Fetches the analytics record for a keyword on `date`.
    ///
    /// # Errors
    ///
    /// See [`AnalyticsClient::get_analytics`].
    pub async fn get_keyword_analytics(
        &self,
        keyword_id: &str,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        self.get_analytics(&EntityRef::Keyword(keyword_id.to_owned()), date, token)
            .await
    }

    /// `GET /api/v1/analytics/{products|keywords}/{id}?date=YYYY-MM-DD`.
    ///
    /// A JSON body of the wrong shape degrades to an empty (pending) envelope
    /// instead of failing.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] on 401/403.
    /// - [`ClientError::NotFound`] on 404.
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not JSON at all.
    pub async fn get_analytics(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        let mut url = self.endpoint(&["analytics", entity.collection(), entity.id()])?;
        url.query_pairs_mut()
            .append_pair("date", &date.format("%Y-%m-%d").to_string());

        let body = self
            .send_json(self.client.get(url).bearer_auth(token), "get_analytics")
            .await?;
        Ok(Self::decode_envelope(body, entity))
    }

    /// # Errors
    ///
    /// See [`AnalyticsClient::generate_analytics`].
    pub async fn generate_product_analytics(
        &self,
        product_id: &str,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        self.generate_analytics(&EntityRef::Product(product_id.to_owned()), date, token)
            .await
    }

    /// # Errors
    ///
    /// See [`AnalyticsClient::generate_analytics`].
    pub async fn generate_keyword_analytics(
        &self,
        keyword_id: &str,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        self.generate_analytics(&EntityRef::Keyword(keyword_id.to_owned()), date, token)
            .await
    }

    /// Asks the backend to (re)generate analytics for `entity` on `date`.
    ///
    /// `POST /api/v1/analytics/{products|keywords}/generate` with
    /// `{ "product_id" | "keyword_id": id, "date": "YYYY-MM-DD" }`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::get_analytics`].
    pub async fn generate_analytics(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        token: &str,
    ) -> Result<AnalyticsEnvelope, ClientError> {
        let url = self.endpoint(&["analytics", entity.collection(), "generate"])?;
        let id_field = match entity {
            EntityRef::Product(_) => "product_id",
            EntityRef::Keyword(_) => "keyword_id",
        };
        let mut payload = serde_json::Map::new();
        payload.insert(id_field.to_owned(), entity.id().into());
        payload.insert("date".to_owned(), date.format("%Y-%m-%d").to_string().into());

        let body = self
            .send_json(
                self.client.post(url).bearer_auth(token).json(&payload),
                "generate_analytics",
            )
            .await?;
        Ok(Self::decode_envelope(body, entity))
    }

    /// Builds `{base}/api/v1/{segments...}` with each segment percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// Sends a request, maps non-2xx statuses to typed errors, and parses the
    /// body as JSON.
    pub(crate) async fn send_json(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(%status, context, "backend returned error status");
            return Err(ClientError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// POSTs `payload` as JSON and decodes a strictly-typed response.
    pub(crate) async fn post_typed<B, T>(
        &self,
        url: Url,
        token: Option<&str>,
        payload: &B,
        context: &str,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(payload);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let body = self.send_json(request, context).await?;
        Self::decode(body, context)
    }

    pub(crate) fn decode<T: DeserializeOwned>(
        body: serde_json::Value,
        context: &str,
    ) -> Result<T, ClientError> {
        serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    fn decode_envelope(body: serde_json::Value, entity: &EntityRef) -> AnalyticsEnvelope {
        serde_json::from_value(body).unwrap_or_else(|e| {
            tracing::warn!(%entity, error = %e, "analytics body is not an envelope; treating as empty");
            AnalyticsEnvelope::default()
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
