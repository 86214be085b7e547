//! Bounded retry with linear backoff
//!
//! Used for the session role lookup on application load. Other store calls
//! do not retry; a failure surfaces immediately.

use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts (at least 1)
    pub attempts: u32,
    /// Base delay; attempt N waits `base_delay * N` before retrying
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted,
/// sleeping `base_delay * attempt` between attempts (linear backoff).
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!("attempt {}/{} failed: {}", attempt, attempts, err);
                if attempt >= attempts {
                    return Err(err);
                }
                tokio::time::sleep(policy.base_delay * attempt).await;
            }
        }
    }
}
