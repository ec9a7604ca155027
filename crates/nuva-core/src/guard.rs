use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::error::InstallError;

/// Run one installer step, bounded by `timeout` and aborted when `cancel`
/// fires. The inner future is dropped on either, which also kills any child
/// process spawned with `kill_on_drop`.
pub async fn run_with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    cancel: &CancellationToken,
    future: F,
) -> Result<T, InstallError>
where
    F: Future<Output = Result<T, InstallError>>,
{
    if cancel.is_cancelled() {
        return Err(InstallError::Cancelled { operation });
    }

    tokio::select! {
        () = cancel.cancelled() => {
            debug!("{operation} cancelled");
            Err(InstallError::Cancelled { operation })
        }
        result = tokio::time::timeout(timeout, future) => match result {
            Ok(value) => value,
            Err(_) => Err(InstallError::Timeout {
                operation,
                seconds: timeout.as_secs(),
            }),
        },
    }
}
