//! Explicit authentication session passed into the client and poller.
//!
//! Nothing here reads or writes ambient state: callers build an
//! [`AuthSession`] from a login response or from configuration and hand it
//! to whatever needs a bearer token.

use serde::{Deserialize, Serialize};

use crate::AppConfig;

/// A tenant ("application") owned by the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedApplication {
    pub id: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub project_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub owned_applications: Vec<OwnedApplication>,
}

/// Bearer credential plus the current tenant and user, if known.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub application_id: Option<String>,
    pub user: Option<User>,
}

impl AuthSession {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_application(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }

    /// Builds a session from `AIVIS_ACCESS_TOKEN` / `AIVIS_APPLICATION_ID`.
    ///
    /// Returns `None` when no token is configured.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let token = config.access_token.as_deref()?;
        let mut session = Self::new(token);
        session.application_id.clone_from(&config.application_id);
        Some(session)
    }

    /// `true` when the session carries a non-blank access token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// The value for an `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("application_id", &self.application_id)
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .finish()
    }
}
