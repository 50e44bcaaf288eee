//! Axum WebSocket transport
//!
//! Maps axum's socket halves onto the session's frame traits.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

use crate::session::{Frame, FrameSink, FrameStream, Transport, TransportError};

/// An upgraded WebSocket ready to carry a session
pub struct WsTransport(WebSocket);

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self(socket)
    }
}

impl Transport for WsTransport {
    type Sink = WsSink;
    type Stream = WsStream;

    fn split(self) -> (WsSink, WsStream) {
        let (sink, stream) = self.0.split();
        (WsSink(sink), WsStream(stream))
    }
}

/// Outbound half of a WebSocket
pub struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, frame: Frame) -> Result<(), TransportError> {
        self.0.send(frame.into()).await.map_err(transport_error)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.0.close().await.map_err(transport_error)
    }
}

/// Inbound half of a WebSocket
pub struct WsStream(SplitStream<WebSocket>);

#[async_trait]
impl FrameStream for WsStream {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        self.0
            .next()
            .await
            .map(|result| result.map(Frame::from).map_err(transport_error))
    }
}

fn transport_error(err: axum::Error) -> TransportError {
    TransportError::Io(err.to_string())
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::Text(text),
            Message::Binary(data) => Frame::Binary(data),
            Message::Ping(data) => Frame::Ping(data),
            Message::Pong(data) => Frame::Pong(data),
            Message::Close(_) => Frame::Close,
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(data) => Message::Binary(data),
            Frame::Ping(data) => Message::Ping(data),
            Frame::Pong(data) => Message::Pong(data),
            Frame::Close => Message::Close(None),
        }
    }
}
