//! Polling cadence and fetch hardening knobs.

use std::time::Duration;

use aivis_core::AppConfig;

/// How often to poll and how hard to try on each attempt.
///
/// The default polls every 5 s at a fixed rate, never gives up while the
/// backend reports progress, and does not retry a failed fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay between the end of one attempt and the start of the next.
    pub interval: Duration,
    /// Growth factor applied per attempt. `1.0` keeps the interval fixed.
    pub backoff_factor: f64,
    /// Upper bound on the delay when `backoff_factor > 1.0`.
    pub max_interval: Duration,
    /// `None` polls until a terminal status.
    pub max_attempts: Option<u32>,
    /// Per-fetch deadline. Expiry counts as a network failure.
    pub request_timeout: Duration,
    /// Extra tries for transient fetch failures within a single attempt.
    pub fetch_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5_000),
            backoff_factor: 1.0,
            max_interval: Duration::from_secs(60),
            max_attempts: None,
            request_timeout: Duration::from_secs(30),
            fetch_retries: 0,
            retry_backoff_base_ms: 1_000,
        }
    }
}

impl PollPolicy {
    /// Policy from the `AIVIS_POLL_*`, `AIVIS_FETCH_*` and timeout settings.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.poll_max_attempts,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            fetch_retries: config.fetch_max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            ..Self::default()
        }
    }

    /// Delay before the attempt following `attempt` (0-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 1.0 {
            return self.interval;
        }
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.interval.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .map_or(self.max_interval, |d| d.min(self.max_interval))
            .max(self.interval.min(self.max_interval))
    }

    /// `true` once `attempts_made` fetches exhaust the attempt budget.
    #[must_use]
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts_made >= max)
    }
}
