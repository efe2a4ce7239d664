//! BoatDash UI gateway.
//!
//! Serves the dashboard's real-time WebSocket channel, relay control and
//! firmware upload endpoints, and optionally the static UI bundle.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use config::GatewayConfig;
pub use error::ServerError;
pub use ui::{run as run_server, serve};
