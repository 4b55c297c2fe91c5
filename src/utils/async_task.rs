use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio::time::timeout;
use tracing::warn;

use crate::BackoffPolicy;
use crate::Error;
use crate::Result;

/// Runs `task` until it succeeds, bounding each attempt by
/// `policy.timeout_ms` and doubling the delay between attempts up to
/// `policy.max_delay_ms`.
///
/// Returns the last attempt's error once `policy.max_retries` attempts have
/// failed.
pub(crate) async fn task_with_timeout_and_exponential_backoff<F, T, P>(
    task: F,
    policy: BackoffPolicy,
) -> Result<P>
where
    F: Fn() -> T,
    T: Future<Output = Result<P>>,
{
    let timeout_duration = Duration::from_millis(policy.timeout_ms);
    let max_delay = Duration::from_millis(policy.max_delay_ms);
    let mut delay = Duration::from_millis(policy.base_delay_ms);

    let mut retries = 0;
    let mut last_error = Error::RetryTaskFailed("Task failed after max retries".to_string());
    while retries < policy.max_retries {
        match timeout(timeout_duration, task()).await {
            Ok(Ok(r)) => {
                return Ok(r);
            }
            Ok(Err(error)) => {
                warn!(attempt = retries + 1, "task failed with error: {:?}", &error);
                last_error = error;
            }
            Err(_) => {
                warn!(attempt = retries + 1, "task timed out after {:?}", timeout_duration);
                last_error = Error::RetryTimeout(timeout_duration);
            }
        };

        retries += 1;
        if retries < policy.max_retries {
            sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        } else {
            warn!("Task failed after {} retries", retries);
        }
    }
    Err(last_error)
}
