//! Live Push Sessions
//!
//! One [`ChannelSession`] per connected peer. A session regenerates its
//! payload on a fixed schedule, pushes it, probes the peer with pings, and
//! tears the channel down on the first failure.
//!
//! ## Architecture
//!
//! - **ChannelSession**: runs the read-loop and write-loop for one peer
//! - **SessionTimers**: the push and heartbeat intervals, owned by the write-loop
//! - **CloseSignal**: idempotent close shared by both loops
//! - **Transport**: the frame sink/stream pair a session runs over
//!
//! ## Lifecycle
//!
//! ```text
//!  upgrade ──► start ──┬── read-loop  (this task)    ──┐
//!                      └── write-loop (spawned task) ──┴──► close once ──► SessionOutcome
//! ```
//!
//! The read-loop only watches liveness: every inbound frame re-arms the
//! deadline. The write-loop is the only writer, so at most one send is ever
//! in flight.

mod channel;
mod config;
mod error;
mod signal;
mod timers;
mod transport;

pub use channel::{ChannelSession, SessionOutcome, WriteStats};
pub use config::SessionConfig;
pub use error::{CloseReason, SessionError, SessionResult};
pub use signal::CloseSignal;
pub use timers::{SessionTimers, Tick};
pub use transport::{Frame, FrameSink, FrameStream, Transport, TransportError};
