//! Handler modules for HTTP and WebSocket endpoints.

pub mod firmware;
pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use firmware::upload_firmware;
pub use http::{get_clients, get_relays, health_check, post_relays};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
