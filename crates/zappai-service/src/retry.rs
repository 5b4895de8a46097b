//! Exponential-backoff retry wrapper for external data source calls.
//!
//! Grounded in `tesi/zappai/utils/common.py::retry_on_error`'s retry-up-to-
//! `max_retries`-then-propagate shape, with the prototype's constant wait
//! replaced by a doubling one between attempts, per spec §7.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Result, ServiceError};

pub async fn retry_on_error<F, Fut, T>(
    max_retries: usize,
    base_wait: Duration,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                retries += 1;
                if retries > max_retries {
                    return Err(ServiceError::DownloadFailed(err.to_string()));
                }
                let wait = backoff_wait(base_wait, retries);
                warn!(attempt = retries, error = %err, wait_ms = wait.as_millis(), "retrying after failure");
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Wait before the `attempt`th retry (1-indexed): `base_wait * 2^(attempt-1)`.
fn backoff_wait(base_wait: Duration, attempt: usize) -> Duration {
    let factor = 1u32 << (attempt - 1).min(31);
    base_wait.saturating_mul(factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let result = retry_on_error(3, Duration::from_millis(1), move || {
            let calls = calls_clone.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(ServiceError::DownloadFailed("transient".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn backoff_wait_doubles_each_attempt() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_wait(base, 1), Duration::from_millis(100));
        assert_eq!(backoff_wait(base, 2), Duration::from_millis(200));
        assert_eq!(backoff_wait(base, 3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let result: Result<i32> = retry_on_error(2, Duration::from_millis(1), || async {
            Err(ServiceError::DownloadFailed("permanent".to_string()))
        })
        .await;
        assert!(result.is_err());
    }
}
