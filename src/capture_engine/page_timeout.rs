//! Timeout utilities for page operations
//!
//! Provides async timeout wrappers to prevent indefinite hangs during
//! page navigation, selector waits, and other browser operations.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::capture_types::{CaptureError, CaptureResult};

/// Wrap an async page operation with an explicit timeout
///
/// # Arguments
/// * `operation` - The async Future to execute with a timeout
/// * `timeout` - Timeout duration
/// * `operation_name` - Human-readable name for error messages
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully
/// * `Err` - Either the operation failed or `CaptureError::Timeout`
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> CaptureResult<T>
where
    F: Future<Output = CaptureResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(CaptureError::Timeout {
            operation: operation_name.to_string(),
            elapsed: timeout,
        }),
    }
}

/// Like [`with_page_timeout`], but also returns promptly on cancellation.
pub async fn cancellable_step<F, T>(
    cancel: &CancellationToken,
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> CaptureResult<T>
where
    F: Future<Output = CaptureResult<T>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CaptureError::Cancelled),
        result = with_page_timeout(operation, timeout, operation_name) => result,
    }
}
