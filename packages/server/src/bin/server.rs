//! BoatDash UI gateway.
//!
//! Pushes controller state to every connected dashboard and accepts relay
//! commands and firmware uploads.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin boatdash-server -- --ap-subnet 192.168.4.0/24
//! ```

use boatdash_server::GatewayConfig;
use boatdash_shared::logger::setup_logger;
use clap::Parser;

#[tokio::main]
async fn main() {
    let config = GatewayConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = boatdash_server::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
