//! Logger initialization shared by BoatDash binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a binary.
///
/// `RUST_LOG` takes precedence when it is set.
pub fn default_directive(bin_name: &str, level: &str) -> String {
    // Cargo bin names use hyphens, tracing targets use underscores
    let target = bin_name.replace('-', "_");
    if target == "boatdash_server" {
        format!("{target}={level},tower_http={level}")
    } else {
        format!("{target}={level},boatdash_server={level},tower_http={level}")
    }
}

/// Install the global tracing subscriber.
///
/// # Arguments
///
/// * `bin_name` - Name of the running binary (usually `env!("CARGO_BIN_NAME")`)
/// * `level` - Default log level when `RUST_LOG` is not set
pub fn setup_logger(bin_name: &str, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(bin_name, level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(true).with_target(true))
        .try_init();

    if let Err(e) = result {
        // A subscriber was already installed (e.g. by a test harness)
        tracing::debug!("Logger already initialized: {}", e);
    }
}
