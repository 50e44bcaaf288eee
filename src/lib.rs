//! # Livepush
//!
//! Live Push Channels - pushes a periodically regenerated drawing of the
//! current time to the browser over a WebSocket.
//!
//! ## Features
//!
//! - **Live push**: a fresh payload on every push tick, one writer per session
//! - **Heartbeat**: ping probes and a liveness window drop dead peers
//! - **Clean teardown**: either loop failing closes the channel exactly once
//! - **Pluggable payloads**: SVG clock, timestamp text, or any closure
//!
//! ## Modules
//!
//! - [`session`]: Channel sessions, timers and the transport traits
//! - [`render`]: Payload sources
//! - [`websocket`]: Axum WebSocket acceptor and transport adapter
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use livepush::render::{RenderError, PayloadSource};
//! use livepush::session::{ChannelSession, SessionConfig};
//! use livepush::websocket::WsTransport;
//! use std::sync::Arc;
//!
//! async fn on_upgrade(socket: axum::extract::ws::WebSocket) {
//!     let payload: Arc<dyn PayloadSource> =
//!         Arc::new(|| -> Result<String, RenderError> { Ok("hello".to_string()) });
//!
//!     let session = ChannelSession::new(SessionConfig::default(), payload);
//!     let outcome = session.start(WsTransport::new(socket)).await;
//!
//!     println!("session ended: {}", outcome.reason);
//! }
//! ```

pub mod api;
pub mod config;
pub mod render;
pub mod session;
pub mod websocket;

// Re-export top-level types for convenience
pub use session::{
    ChannelSession, CloseReason, CloseSignal, Frame, FrameSink, FrameStream, SessionConfig,
    SessionError, SessionOutcome, SessionResult, SessionTimers, Tick, Transport, TransportError,
    WriteStats,
};

pub use render::{
    PayloadKind, PayloadSource, RenderError, RenderResult, SvgCanvas, SvgClock, TimeFormat,
    TimestampClock,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{websocket_handler, WsTransport};

pub use config::{
    generate_default_config, Config, ConfigError, LoggingConfig, RenderConfig, ServerConfig,
    SessionSettings,
};
