//! Session error types

use std::time::Duration;
use thiserror::Error;

use super::transport::TransportError;

/// Errors that end a session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Peer stream failed (protocol error, reset)
    #[error("Read failed: {0}")]
    Read(TransportError),

    /// Outbound frame could not be written
    #[error("Write failed: {0}")]
    Write(TransportError),

    /// Outbound frame did not complete within the write deadline
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// No inbound frame within the liveness window
    #[error("No frame from peer within {0:?}")]
    LivenessTimeout(Duration),

    /// Write-loop task ended without closing the session (panic)
    #[error("Write loop aborted: {0}")]
    WriteLoopAborted(String),

    /// Timer settings that cannot keep a session alive
    #[error("Invalid session config: {0}")]
    InvalidConfig(String),
}

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent a close frame or the stream ended
    PeerClosed,
    /// One of the loops failed
    Failed(SessionError),
}

impl CloseReason {
    pub fn is_error(&self) -> bool {
        matches!(self, CloseReason::Failed(_))
    }
}

impl From<SessionError> for CloseReason {
    fn from(err: SessionError) -> Self {
        CloseReason::Failed(err)
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::PeerClosed => write!(f, "peer closed"),
            CloseReason::Failed(e) => write!(f, "{}", e),
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
