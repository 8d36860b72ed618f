//! Status tracking and retry policy for write-style requests.
//!
//! A mutation is one asynchronous operation with a visible lifecycle:
//! idle, pending, then success or error. The UI renders from
//! `MutationStatus`; `run_with_retry` decides whether a failure is
//! worth repeating.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Initial backoff delay in milliseconds before the first retry.
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 1000;

/// Number of automatic retries applied when nothing else is configured.
const DEFAULT_MAX_RETRIES: u32 = 1;

/// Lifecycle of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus<T> {
    Idle,
    Pending,
    Success(T),
    /// Failure, holding a message fit for display.
    Error(String),
}

impl<T> Default for MutationStatus<T> {
    fn default() -> Self {
        MutationStatus::Idle
    }
}

impl<T> MutationStatus<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, MutationStatus::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MutationStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationStatus::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MutationStatus::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            MutationStatus::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// How many times, and how patiently, to repeat a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Run exactly once.
    pub fn none() -> Self {
        Self::default().with_max_retries(0)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }
}

/// Run `op`, repeating it while it fails with a retryable error and the
/// policy allows. Backoff doubles after every retry.
pub async fn run_with_retry<T, E, F, Fut, R>(
    policy: RetryPolicy,
    mut op: F,
    is_retryable: R,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: Display,
{
    let mut retries = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if retries < policy.max_retries && is_retryable(&e) => {
                retries += 1;
                warn!(
                    retry = retries,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Request failed, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast(retries: u32) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_retries(retries)
            .with_initial_backoff(Duration::from_millis(1))
    }

    #[test]
    fn test_status_helpers() {
        let idle: MutationStatus<()> = MutationStatus::default();
        assert!(idle.is_idle());

        let err: MutationStatus<()> = MutationStatus::Error("nope".to_string());
        assert!(err.is_error());
        assert_eq!(err.error_message(), Some("nope"));
        assert!(MutationStatus::Success(1).is_success());
        assert!(MutationStatus::<()>::Pending.is_pending());
    }

    #[test]
    fn test_policy_defaults() {
        assert_eq!(RetryPolicy::default().max_retries, 1);
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = run_with_retry(
            fast(3),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_once_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, String> = run_with_retry(
            fast(1),
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("flaky".to_string())
                } else {
                    Ok("ok")
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = run_with_retry(
            fast(2),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            },
            |_| true,
        )
        .await;
        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = run_with_retry(
            fast(5),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("bad input".to_string())
            },
            |_| false,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_retry_policy_runs_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), String> = run_with_retry(
            RetryPolicy::none(),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            },
            |_| true,
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
