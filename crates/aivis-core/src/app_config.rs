#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Backend origin, e.g. `http://localhost:8080`. Endpoint paths
    /// (`/api/v1/...`) are appended by the client.
    pub api_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub poll_interval_ms: u64,
    /// `None` polls until a terminal status is observed.
    pub poll_max_attempts: Option<u32>,
    pub fetch_max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub access_token: Option<String>,
    pub application_id: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("api_base_url", &self.api_base_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("application_id", &self.application_id)
            .finish()
    }
}
