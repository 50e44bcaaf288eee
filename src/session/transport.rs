//! Frame transport
//!
//! The session never sees a socket type directly. It writes through a
//! [`FrameSink`] and reads through a [`FrameStream`]; the WebSocket adapter
//! lives in `crate::websocket`.

use async_trait::async_trait;
use thiserror::Error;

/// A single message on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

impl Frame {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Text(_) => "text",
            Frame::Binary(_) => "binary",
            Frame::Ping(_) => "ping",
            Frame::Pong(_) => "pong",
            Frame::Close => "close",
        }
    }
}

/// Transport-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection is already closed
    #[error("Connection closed")]
    Closed,

    /// Underlying I/O or protocol error
    #[error("Transport error: {0}")]
    Io(String),
}

/// Outbound half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Write one frame
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Inbound half of a connection
///
/// `next_frame` must be cancel safe: the read-loop drops it when the
/// liveness deadline fires.
#[async_trait]
pub trait FrameStream: Send {
    /// Wait for the next frame; `None` once the peer has gone away
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>>;
}

/// A connection that can be split into its two halves
pub trait Transport: Send + 'static {
    type Sink: FrameSink + 'static;
    type Stream: FrameStream;

    fn split(self) -> (Self::Sink, Self::Stream);
}
