//! HTTP / WebSocket gateway.

mod body;
mod error;
mod extract;
mod handler;
mod router;
mod runner;
mod signal;
pub mod state;
mod telemetry;

pub use body::{DrainError, DrainLimits, drain_body, read_request_body};
pub use error::ApiError;
pub use extract::PeerAddr;
pub use router::create_router;
pub use runner::{run, serve};
pub use state::AppState;
