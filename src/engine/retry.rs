//! Bounded retry with exponential backoff for transient storage failures.
//!
//! Only failures classified as transient by
//! [`StorageError::is_transient`](crate::error::StorageError::is_transient)
//! are retried; everything else surfaces immediately. Jitter of up to 20%
//! of the current delay is added to avoid retry stampedes.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::StoreResult;

/// Run `attempt` up to `config.max_attempts` times.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    op: &'static str,
    mut attempt: F,
) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut delay_ms = config.initial_delay_ms;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempts < config.max_attempts => {
                let delay = delay_ms + jitter_ms(delay_ms);
                warn!(
                    op,
                    attempt = attempts,
                    delay_ms = delay,
                    error = %err,
                    "transient storage failure, retrying"
                );
                sleep(Duration::from_millis(delay)).await;
                delay_ms = ((delay_ms as f64) * config.backoff_multiplier) as u64;
                delay_ms = delay_ms.min(config.max_delay_ms);
            }
            Err(err) => return Err(err),
        }
    }
}

fn jitter_ms(base_ms: u64) -> u64 {
    let range = base_ms / 5;
    if range == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast_retry(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StorageError::Unavailable {
                        reason: "flaky".into(),
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_surfaces_the_last_error() {
        let calls = AtomicU32::new(0);
        let result: StoreResult<u32> = with_retry(&fast_retry(3), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StorageError::Unavailable {
                    reason: "still down".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(StorageError::Unavailable { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_failures_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: StoreResult<u32> = with_retry(&fast_retry(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StorageError::Internal {
                    reason: "corrupt".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(StorageError::Internal { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn conflicts_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: StoreResult<u32> = with_retry(&fast_retry(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(StorageError::Conflict {
                    reason: "version moved".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(StorageError::Conflict { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn jitter_is_bounded_by_a_fifth_of_base() {
        for _ in 0..100 {
            assert!(jitter_ms(100) <= 20);
        }
        assert_eq!(jitter_ms(0), 0);
        assert_eq!(jitter_ms(4), 0);
    }
}
