use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so a bare environment yields a config that
/// talks to a local backend on port 8080.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset so `.env` templates can leave them blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("AIVIS_ENV", "development"))?;

    let api_base_url = parse_base_url(&or_default("AIVIS_API_BASE_URL", "http://localhost:8080"))?;
    let log_level = or_default("AIVIS_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("AIVIS_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("AIVIS_USER_AGENT", "aivis/0.1 (visibility-analytics)");

    let poll_interval_ms = parse_u64("AIVIS_POLL_INTERVAL_MS", "5000")?;
    if poll_interval_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_POLL_INTERVAL_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let poll_max_attempts = match optional("AIVIS_POLL_MAX_ATTEMPTS") {
        Some(raw) => Some(raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: "AIVIS_POLL_MAX_ATTEMPTS".to_string(),
            reason: e.to_string(),
        })?),
        None => None,
    };
    let fetch_max_retries = parse_u32("AIVIS_FETCH_MAX_RETRIES", "0")?;
    let retry_backoff_base_ms = parse_u64("AIVIS_RETRY_BACKOFF_BASE_MS", "1000")?;

    let access_token = optional("AIVIS_ACCESS_TOKEN");
    let application_id = optional("AIVIS_APPLICATION_ID");

    Ok(AppConfig {
        env,
        api_base_url,
        log_level,
        request_timeout_secs,
        user_agent,
        poll_interval_ms,
        poll_max_attempts,
        fetch_max_retries,
        retry_backoff_base_ms,
        access_token,
        application_id,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Requires an `http(s)://` scheme and strips any trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "AIVIS_API_BASE_URL".to_string(),
            reason: format!("'{raw}' must start with http:// or https://"),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
