//! Gateway configuration.
//!
//! Every option can be given on the command line or through a `BOATDASH_*`
//! environment variable.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, builder::RangedU64ValueParser};

use crate::domain::{DEFAULT_AP_SUBNET, DEFAULT_CLIENT_CAPACITY, Ipv4Cidr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_COMMAND_MAX_BYTES: usize = 128;
pub const DEFAULT_FIRMWARE_MAX_BYTES: usize = 4 * 1024 * 1024;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_READ_RETRIES: u32 = 3;
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_SEND_QUEUE: usize = 16;
pub const DEFAULT_TELEMETRY_INTERVAL_MS: u64 = 1000;

/// BoatDash UI gateway.
#[derive(Parser, Debug, Clone)]
#[command(name = "boatdash-server", version, about = "BoatDash UI gateway")]
pub struct GatewayConfig {
    /// Host to bind.
    #[arg(long, env = "BOATDASH_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind (0 for auto-assign).
    #[arg(long, env = "BOATDASH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of connected dashboard clients.
    #[arg(
        long,
        env = "BOATDASH_MAX_CLIENTS",
        default_value_t = DEFAULT_CLIENT_CAPACITY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=64)
    )]
    pub max_clients: usize,

    /// Access-point subnet whose peers are trusted.
    #[arg(long, env = "BOATDASH_AP_SUBNET", default_value_t = DEFAULT_AP_SUBNET)]
    pub ap_subnet: Ipv4Cidr,

    /// Restrict relay control to access-point peers.
    #[arg(long, env = "BOATDASH_GUARD_RELAYS")]
    pub guard_relays: bool,

    /// Largest accepted relay command body.
    #[arg(long, env = "BOATDASH_COMMAND_MAX_BYTES", default_value_t = DEFAULT_COMMAND_MAX_BYTES)]
    pub command_max_bytes: usize,

    /// Largest accepted firmware image.
    #[arg(long, env = "BOATDASH_FIRMWARE_MAX_BYTES", default_value_t = DEFAULT_FIRMWARE_MAX_BYTES)]
    pub firmware_max_bytes: usize,

    /// Time to wait for each chunk of a request body.
    #[arg(long, env = "BOATDASH_READ_TIMEOUT_MS", default_value_t = DEFAULT_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,

    /// Consecutive body read timeouts tolerated before the request fails.
    #[arg(long, env = "BOATDASH_READ_RETRIES", default_value_t = DEFAULT_READ_RETRIES)]
    pub read_retries: u32,

    /// Time a single client may hold up a broadcast.
    #[arg(long, env = "BOATDASH_SEND_TIMEOUT_MS", default_value_t = DEFAULT_SEND_TIMEOUT_MS)]
    pub send_timeout_ms: u64,

    /// Outgoing frames queued per client.
    #[arg(
        long,
        env = "BOATDASH_SEND_QUEUE",
        default_value_t = DEFAULT_SEND_QUEUE,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=1024)
    )]
    pub send_queue: usize,

    /// Directory holding the dashboard UI bundle.
    #[arg(long, env = "BOATDASH_ASSETS_DIR")]
    pub assets_dir: Option<PathBuf>,

    /// State snapshot interval (0 disables the snapshot ticker).
    #[arg(
        long,
        env = "BOATDASH_TELEMETRY_INTERVAL_MS",
        default_value_t = DEFAULT_TELEMETRY_INTERVAL_MS
    )]
    pub telemetry_interval_ms: u64,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, env = "BOATDASH_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl GatewayConfig {
    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Snapshot ticker period, `None` when disabled
    pub fn telemetry_interval(&self) -> Option<Duration> {
        (self.telemetry_interval_ms > 0).then(|| Duration::from_millis(self.telemetry_interval_ms))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_CLIENT_CAPACITY,
            ap_subnet: DEFAULT_AP_SUBNET,
            guard_relays: false,
            command_max_bytes: DEFAULT_COMMAND_MAX_BYTES,
            firmware_max_bytes: DEFAULT_FIRMWARE_MAX_BYTES,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            read_retries: DEFAULT_READ_RETRIES,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            send_queue: DEFAULT_SEND_QUEUE,
            assets_dir: None,
            telemetry_interval_ms: DEFAULT_TELEMETRY_INTERVAL_MS,
            log_level: "info".to_string(),
        }
    }
}
