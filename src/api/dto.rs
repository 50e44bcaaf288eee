//! Data Transfer Objects
//!
//! Response types serialized to JSON by the API endpoints.

use serde::{Deserialize, Serialize};

/// Full health status response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// Payload pushed by sessions (svg, timestamp)
    pub payload: String,
    /// Sessions currently running
    pub active_sessions: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
