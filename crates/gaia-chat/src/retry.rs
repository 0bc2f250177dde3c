//! Retrying agent calls that fail for transient reasons.
//!
//! Rate limits (429), gateway/server errors (5xx) and network timeouts are
//! retried with capped exponential backoff. Client errors (400/401/403/404/422)
//! fail immediately.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry policy for calls to the agent backend.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt (0 = fail immediately).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_retries: retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (0-indexed), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        Duration::from_secs_f64(base.min(self.max_delay.as_secs_f64()))
    }
}

/// How a failure should be treated by [`retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// Classify an error string produced by the HTTP client.
///
/// Permanent markers win over transient ones; anything unrecognised is
/// treated as permanent.
pub fn classify_error(error: &str) -> ErrorClass {
    const PERMANENT: &[&str] = &[
        "HTTP 400", "HTTP 401", "HTTP 403", "HTTP 404", "HTTP 422",
    ];
    const TRANSIENT_STATUS: &[&str] = &["HTTP 429", "HTTP 500", "HTTP 502", "HTTP 503", "HTTP 504"];
    const TRANSIENT_NETWORK: &[&str] = &[
        "request failed:",
        "connection reset",
        "connection refused",
        "timed out",
        "timeout",
        "broken pipe",
    ];

    if PERMANENT.iter().any(|p| error.contains(p)) {
        return ErrorClass::Permanent;
    }
    let lower = error.to_lowercase();
    if TRANSIENT_STATUS.iter().any(|p| error.contains(p))
        || TRANSIENT_NETWORK.iter().any(|p| lower.contains(p))
    {
        ErrorClass::Transient
    } else {
        ErrorClass::Permanent
    }
}

/// Run `op` until it succeeds, fails permanently, or retries run out.
pub async fn retry<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < config.max_retries && classify_error(&e) == ErrorClass::Transient => {
                let delay = config.delay_for_attempt(attempt);
                attempt += 1;
                warn!(
                    "Transient error (attempt {attempt}/{}), retrying in {:.1}s: {e}",
                    config.max_retries,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
