use std::time::Duration;

use color_eyre::Result;
use log::warn;
use tokio::time::sleep;

/// Bounded exponential backoff applied to every outbound service call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Runs `op` until it succeeds or `policy.max_attempts` attempts are spent,
/// sleeping `base_delay * 2^attempt` between attempts. The final error is
/// returned wrapped with `what`.
pub async fn retry<T, Fut, F>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < policy.max_attempts => {
                warn!("{what} failed (attempt {}): {err:#}", attempt + 1);
                sleep(policy.delay(attempt)).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(err.wrap_err(format!(
                    "{what} failed after {} attempts",
                    policy.max_attempts
                )));
            }
        }
    }
}
