//! Shared close signal

use std::sync::OnceLock;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use super::error::CloseReason;

/// Close state shared by a session's two loops
///
/// The first `close` wins and records its reason; later calls are no-ops.
#[derive(Debug, Default)]
pub struct CloseSignal {
    reason: OnceLock<CloseReason>,
    token: CancellationToken,
}

impl CloseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session closed
    ///
    /// Returns true if this call closed it.
    pub fn close(&self, reason: CloseReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        if first {
            self.token.cancel();
        }
        first
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded by the first `close`
    pub fn reason(&self) -> Option<&CloseReason> {
        self.reason.get()
    }

    /// Resolves once the session is closed
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}
