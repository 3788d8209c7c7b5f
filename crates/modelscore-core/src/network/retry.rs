//! Retry logic with exponential backoff and server-provided wait hints.
//!
//! Used by the HTTP layer when the rate-limit policy allows re-attempts.
//! The caller decides per error whether to stop, retry on the computed
//! backoff, or retry after a specific wait.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub base_delay: Duration,
    /// Cap for computed delays and for explicit wait hints.
    pub max_delay: Duration,
    /// Scale each computed delay by a random factor in [0.5, 1.5).
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Doubling backoff for the 0-indexed `attempt`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let cap = self.max_delay.as_secs_f64();
        let mut secs = (self.base_delay.as_secs_f64() * 2f64.powi(attempt as i32)).min(cap);
        if self.jitter {
            secs = (secs * rand::rng().random_range(0.5..1.5)).min(cap);
        }
        Duration::from_secs_f64(secs)
    }

    /// Delay to sleep for `decision`, `None` when retrying should stop.
    fn delay_for(&self, decision: RetryDecision, attempt: u32) -> Option<Duration> {
        match decision {
            RetryDecision::Stop => None,
            RetryDecision::Retry => Some(self.backoff_delay(attempt)),
            RetryDecision::RetryAfter(hint) => Some(hint.min(self.max_delay)),
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up and return the error.
    Stop,
    /// Retry after the exponential backoff delay.
    Retry,
    /// Retry after the given wait (clamped to `max_delay`).
    RetryAfter(Duration),
}

/// Attempts made and time spent waiting between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryStats {
    pub attempts: u32,
    pub total_delay: Duration,
}

/// Retry an async operation.
///
/// `decide` inspects each error and returns the [`RetryDecision`].
/// Returns the final result together with [`RetryStats`].
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    decide: impl Fn(&E) -> RetryDecision,
) -> (Result<T, E>, RetryStats)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut stats = RetryStats::default();

    loop {
        let attempt = stats.attempts;
        stats.attempts += 1;

        let error = match operation().await {
            Ok(value) => return (Ok(value), stats),
            Err(e) => e,
        };

        let Some(delay) = config.delay_for(decide(&error), attempt) else {
            debug!("Giving up on non-retryable error: {}", error);
            return (Err(error), stats);
        };
        if stats.attempts >= config.max_attempts {
            warn!("Giving up after {} attempts: {}", stats.attempts, error);
            return (Err(error), stats);
        }

        warn!(
            "Attempt {}/{} failed ({}), waiting {:?}",
            stats.attempts, config.max_attempts, error, delay
        );
        stats.total_delay += delay;
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_calculation_no_jitter() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(1))
            .with_jitter(false);

        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(30))
            .with_jitter(false);

        assert_eq!(config.backoff_delay(3), Duration::from_secs(30));
        assert_eq!(
            config.delay_for(RetryDecision::RetryAfter(Duration::from_secs(3600)), 0),
            Some(Duration::from_secs(30))
        );
        assert_eq!(config.delay_for(RetryDecision::Stop, 0), None);
    }

    #[test]
    fn test_delay_with_jitter_stays_in_range() {
        let config = RetryConfig::new()
            .with_base_delay(Duration::from_secs(2))
            .with_jitter(true);

        for _ in 0..20 {
            let delay = config.backoff_delay(0);
            assert!(
                delay >= Duration::from_secs(1) && delay <= Duration::from_secs(3),
                "jittered delay {:?} out of range",
                delay
            );
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_first_try() {
        let config = RetryConfig::new().with_max_attempts(3);

        let (result, stats) = retry_async(
            &config,
            || async { Ok::<_, String>(42) },
            |_: &String| RetryDecision::Retry,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.total_delay, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_hint_is_used() {
        let config = RetryConfig::new()
            .with_max_attempts(3)
            .with_max_delay(Duration::from_secs(5))
            .with_jitter(false);

        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let (result, stats) = retry_async(
            &config,
            || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("rate limited".to_string())
                    } else {
                        Ok(7)
                    }
                }
            },
            |_: &String| RetryDecision::RetryAfter(Duration::from_secs(120)),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.total_delay, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted() {
        let config = RetryConfig::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(10))
            .with_jitter(false);

        let (result, stats) = retry_async(
            &config,
            || async { Err::<i32, _>("always fails".to_string()) },
            |_: &String| RetryDecision::Retry,
        )
        .await;

        assert_eq!(result.unwrap_err(), "always fails");
        assert_eq!(stats.attempts, 3);
        // 10ms then 20ms; no wait after the last attempt
        assert_eq!(stats.total_delay, Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_stop_decision_makes_one_attempt() {
        let config = RetryConfig::new().with_max_attempts(3);

        let (result, stats) = retry_async(
            &config,
            || async { Err::<i32, _>("not found".to_string()) },
            |_: &String| RetryDecision::Stop,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(stats.attempts, 1);
    }
}
