//! Login and registration endpoints.
//!
//! Both return an [`AuthSession`]; persisting it is the caller's business.

use aivis_core::{AuthSession, User};
use serde::{Deserialize, Serialize};

use crate::client::AnalyticsClient;
use crate::error::ClientError;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

/// Sign-up form. With `app_name` set the backend also creates a tenant.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisteredApplication {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    application: Option<RegisteredApplication>,
}

impl AnalyticsClient {
    /// `POST /api/v1/users/login`.
    ///
    /// The first application owned by the user becomes the session tenant.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] on rejected credentials.
    /// - [`ClientError::UnexpectedStatus`] / [`ClientError::Http`] otherwise.
    /// - [`ClientError::Deserialize`] if the response lacks `access_token`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ClientError> {
        let url = self.endpoint(&["users", "login"])?;
        let response: LoginResponse = self
            .post_typed(url, None, &LoginRequest { email, password }, "login")
            .await?;

        let application_id = response
            .user
            .as_ref()
            .and_then(|u| u.owned_applications.first())
            .map(|app| app.id.clone());

        tracing::info!(
            email,
            has_application = application_id.is_some(),
            "login succeeded"
        );

        Ok(AuthSession {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            application_id,
            user: response.user,
        })
    }

    /// `POST /api/v1/users/register-with-app`, or `/users/register` when no
    /// application name is given.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsClient::login`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession, ClientError> {
        let route = if request.app_name.is_some() {
            "register-with-app"
        } else {
            "register"
        };
        let url = self.endpoint(&["users", route])?;
        let response: RegisterResponse = self.post_typed(url, None, request, "register").await?;

        let application_id = response
            .application
            .map(|app| app.id)
            .or_else(|| {
                response
                    .user
                    .as_ref()
                    .and_then(|u| u.owned_applications.first())
                    .map(|app| app.id.clone())
            });

        tracing::info!(email = %request.email, route, "registration succeeded");

        Ok(AuthSession {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            application_id,
            user: response.user,
        })
    }
}
