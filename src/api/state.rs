//! Application State
//!
//! Shared state accessible by all handlers.
//! Built once at startup and wrapped in Arc for the router.

use handlebars::Handlebars;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::api::error::ApiResult;
use crate::api::routes::home::page_templates;
use crate::config::{Config, ConfigError};
use crate::render::{PayloadKind, PayloadSource, SvgClock};
use crate::session::SessionConfig;

/// Shared application state for all handlers
pub struct AppState {
    /// Source rendered on every push tick and on the home page
    pub payload: Arc<dyn PayloadSource>,
    /// Whether the payload is markup (SVG) or plain text
    pub payload_kind: PayloadKind,
    /// Renderer behind `/snapshot`
    pub snapshot: SvgClock,
    /// Timer settings handed to every new session
    pub session: SessionConfig,
    /// Largest inbound WebSocket message accepted
    pub read_limit: usize,
    /// Compiled page templates
    pub templates: Handlebars<'static>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    active_sessions: AtomicUsize,
}

impl AppState {
    /// Create state from explicit parts
    pub fn new(
        payload: Arc<dyn PayloadSource>,
        payload_kind: PayloadKind,
        snapshot: SvgClock,
        session: SessionConfig,
        read_limit: usize,
    ) -> ApiResult<Self> {
        Ok(Self {
            payload,
            payload_kind,
            snapshot,
            session,
            read_limit,
            templates: page_templates()?,
            start_time: Instant::now(),
            active_sessions: AtomicUsize::new(0),
        })
    }

    /// Build state from loaded configuration
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let render = &config.render;
        if render.width == 0 || render.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be non-zero, got {}x{}",
                render.width, render.height
            ))
            .into());
        }

        Self::new(
            render.payload.source(render.width, render.height, render.time_format),
            render.payload,
            SvgClock::new(render.width, render.height, render.time_format),
            config.session_config()?,
            config.server.read_limit,
        )
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Number of sessions currently running
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Record a session start; returns the new count
    pub fn session_opened(&self) -> usize {
        self.active_sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Record a session end; returns the new count
    pub fn session_closed(&self) -> usize {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;

    #[test]
    fn test_from_default_config() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert_eq!(state.payload_kind, PayloadKind::Svg);
        assert_eq!(state.read_limit, 512);
        assert_eq!(state.session, SessionConfig::default());
        assert_eq!(state.snapshot.width(), 400);
        assert!(state.templates.has_template("home"));
    }

    #[test]
    fn test_from_config_rejects_bad_timers() {
        let mut config = Config::default();
        config.session.ping_period_ms = Some(config.session.pong_wait_ms);
        assert!(matches!(
            AppState::from_config(&config),
            Err(ApiError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_from_config_rejects_empty_canvas() {
        let mut config = Config::default();
        config.render.width = 0;
        assert!(matches!(
            AppState::from_config(&config),
            Err(ApiError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_session_counter() {
        let state = AppState::from_config(&Config::default()).unwrap();
        assert_eq!(state.session_opened(), 1);
        assert_eq!(state.session_opened(), 2);
        assert_eq!(state.session_closed(), 1);
        assert_eq!(state.active_sessions(), 1);
    }
}
