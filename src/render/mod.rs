//! Payload Rendering
//!
//! Produces the payload strings pushed to connected clients.
//!
//! ## Sources
//!
//! - **SvgClock**: a circle with the current time written across it
//! - **TimestampClock**: the current time as bare text
//!
//! Any `Fn() -> Result<String, RenderError>` closure is also a
//! [`PayloadSource`], which is how sessions are driven in tests.

mod clock;
mod svg;

pub use clock::{TimeFormat, TimestampClock};
pub use svg::{SvgCanvas, SvgClock};

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Produces a fresh payload snapshot on every call
///
/// Implementations must be callable an unbounded number of times and must not
/// have side effects the session can observe.
pub trait PayloadSource: Send + Sync {
    /// Render the current payload
    fn render(&self) -> Result<String, RenderError>;
}

impl<F> PayloadSource for F
where
    F: Fn() -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self) -> Result<String, RenderError> {
        self()
    }
}

/// Which payload the server pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// SVG drawing of the current time
    #[default]
    Svg,
    /// The current time as plain text
    Timestamp,
}

impl PayloadKind {
    /// Whether clients should treat pushed payloads as markup
    pub fn is_markup(&self) -> bool {
        matches!(self, PayloadKind::Svg)
    }

    /// Build the payload source for this kind
    pub fn source(
        &self,
        width: u32,
        height: u32,
        format: TimeFormat,
    ) -> Arc<dyn PayloadSource> {
        match self {
            PayloadKind::Svg => Arc::new(SvgClock::new(width, height, format)),
            PayloadKind::Timestamp => Arc::new(TimestampClock::new(format)),
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadKind::Svg => write!(f, "svg"),
            PayloadKind::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Errors raised while producing a payload
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing into the output buffer failed
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Canvas dimensions cannot produce a drawing
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Source-specific failure
    #[error("Render failed: {0}")]
    Other(String),
}

/// Result type for render operations
pub type RenderResult<T> = Result<T, RenderError>;
