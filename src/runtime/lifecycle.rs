//! Request lifecycle shared by the initializer and the controller

use crate::backend::BackendError;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Run one backend request, bounded by `timeout`.
///
/// The request is never retried; an elapsed timeout becomes
/// `BackendErrorKind::Timeout`.
pub async fn dispatch<T, F>(timeout: Duration, request: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, request).await {
        result
    } else {
        tracing::warn!(timeout_ms = %timeout.as_millis(), "Backend request timed out");
        Err(BackendError::timeout(timeout))
    }
}

/// At most one outstanding request per owner
///
/// A second `try_begin` while a guard is alive fails instead of queuing.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the slot, or `None` if a request is already outstanding
    pub fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { flight: self })
    }
}

/// Releases the slot on drop, on every exit path
#[derive(Debug)]
pub struct FlightGuard<'a> {
    flight: &'a SingleFlight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flight.busy.store(false, Ordering::Release);
    }
}
