//! Retry Policy
//!
//! Exponential backoff with jitter, bounded by attempt count. Timing state is
//! explicit (`RetryState`) and delays run through an injected `Sleeper`, so
//! retry behavior is unit-testable without real sleeping.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Retry configuration for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (first try included).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
    /// Jitter factor (0.0-1.0) applied around the computed delay.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Compute the backoff delay before retry number `retry_index` (0-based).
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64 * self.multiplier.powi(retry_index as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let jitter_range = capped * self.jitter;
        let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
        let with_jitter = (capped + jitter).max(0.0);

        Duration::from_millis(with_jitter as u64)
    }
}

/// Per-request retry bookkeeping.
///
/// Scoped to a single logical request and dropped when it terminates.
#[derive(Debug, Default)]
pub struct RetryState {
    attempts: u32,
    backoff_elapsed: Duration,
    last_error_class: Option<&'static str>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an attempt.
    pub fn begin_attempt(&mut self) {
        self.attempts += 1;
    }

    /// Attempts started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Retries spent (attempts beyond the first).
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Check whether the policy allows another attempt.
    pub fn can_retry(&self, policy: &RetryPolicy) -> bool {
        self.attempts < policy.max_attempts
    }

    /// Record a backoff delay about to be slept and the error that caused it.
    pub fn record_backoff(&mut self, delay: Duration, error_class: &'static str) {
        self.backoff_elapsed += delay;
        self.last_error_class = Some(error_class);
    }

    /// Total backoff time spent on this request.
    pub fn backoff_elapsed(&self) -> Duration {
        self.backoff_elapsed
    }

    /// Class of the most recent retried error, for logging.
    pub fn last_error_class(&self) -> Option<&'static str> {
        self.last_error_class
    }
}

/// Injectable delay, so backoff suspends only the calling task and tests run
/// without wall-clock sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Test sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sleep_count(&self) -> usize {
        self.slept.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(delay);
        }
    }
}
