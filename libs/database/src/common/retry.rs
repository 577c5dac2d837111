use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff for connecting while the database starts up.
///
/// The delay doubles after each failure, starting at `base_delay` and never
/// exceeding `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Shorten each wait by up to half
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 6,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    pub fn without_jitter(self) -> Self {
        Self {
            jitter: false,
            ..self
        }
    }

    /// Wait after the `failures`-th consecutive failure, before jitter.
    pub fn backoff(&self, failures: u32) -> Duration {
        let shift = failures.saturating_sub(1).min(16);
        self.base_delay
            .checked_mul(1 << shift)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    fn wait(&self, failures: u32) -> Duration {
        let delay = self.backoff(failures);
        if self.jitter { jittered(delay) } else { delay }
    }
}

/// Retry `operation` per `config`, returning the last error once attempts run out.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut failures = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        failures += 1;

        if failures >= config.attempts {
            warn!(failures, %error, "Retry budget exhausted");
            return Err(error);
        }

        let wait = config.wait(failures);
        debug!(failures, wait_ms = wait.as_millis() as u64, %error, "Attempt failed, backing off");
        tokio::time::sleep(wait).await;
    }
}

/// Scale `delay` into [50%, 100%].
fn jittered(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    delay.mul_f64(percent as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts, Duration::from_millis(2)).without_jitter()
    }

    async fn fail_times(failures: u32, config: RetryConfig) -> (Result<&'static str, String>, u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < failures {
                        Err("connection refused".to_string())
                    } else {
                        Ok("connected")
                    }
                }
            },
            config,
        )
        .await;

        (result, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn first_success_is_not_retried() {
        let (result, calls) = fail_times(0, quick(3)).await;
        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let (result, calls) = fail_times(2, quick(3)).await;
        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn last_error_is_returned_after_all_attempts() {
        let (result, calls) = fail_times(10, quick(3)).await;
        assert_eq!(result.unwrap_err(), "connection refused");
        assert_eq!(calls, 3);
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let config = RetryConfig {
            max_delay: Duration::from_millis(1000),
            ..RetryConfig::new(10, Duration::from_millis(100))
        };

        let waits: Vec<u128> = (1..=6).map(|n| config.backoff(n).as_millis()).collect();
        assert_eq!(waits, [100, 200, 400, 800, 1000, 1000]);
        assert_eq!(config.backoff(u32::MAX), Duration::from_millis(1000));
    }

    #[test]
    fn jitter_never_exceeds_the_nominal_wait() {
        for _ in 0..20 {
            let wait = jittered(Duration::from_millis(1000));
            assert!(wait >= Duration::from_millis(500) && wait <= Duration::from_millis(1000));
        }
    }
}
