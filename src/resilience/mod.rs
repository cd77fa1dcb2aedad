//! Resilience
//!
//! Retry/backoff policy and the injectable delay used by the gateway.

pub mod retry;

pub use retry::{RecordingSleeper, RetryPolicy, RetryState, Sleeper, TokioSleeper};
