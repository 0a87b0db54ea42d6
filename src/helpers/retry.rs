use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::RemoteError;

pub const RETRY_LIMIT: usize = 5;
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Bounded, fixed-delay retry for remote calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: RETRY_LIMIT,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: usize, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Runs `call` until it succeeds, fails terminally, or the policy runs out of
/// attempts. The last error is returned on exhaustion.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(
                    "{} failed due to: {}, retrying in {:?} (attempt {}/{})",
                    operation, e, policy.delay, attempt, attempts
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
