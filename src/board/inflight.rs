use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::ClientError;

/// Single-slot "request in progress" flag.
///
/// A control that is mid-request rejects a second invocation with
/// `ClientError::Busy` instead of queueing it.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

/// Held for the duration of one request; releases the slot on drop, including
/// when the owning future is cancelled.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, action: &'static str) -> Result<InFlightGuard, ClientError> {
        if self
            .0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy { action });
        }
        Ok(InFlightGuard(self.0.clone()))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
