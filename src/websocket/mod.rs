//! WebSocket Live Push
//!
//! Clients connect to `/ws` and receive a freshly rendered payload as a text
//! frame on every push tick, plus an empty ping every heartbeat period.
//! Clients never need to send anything: the browser answers pings with pongs.
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8080/ws');
//!
//! ws.onmessage = (event) => {
//!   document.getElementById('payload').innerHTML = event.data;
//! };
//! ```

mod adapter;
mod handler;

pub use adapter::{WsSink, WsStream, WsTransport};
pub use handler::websocket_handler;
