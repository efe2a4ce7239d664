//! WebSocket message DTOs pushed to dashboard clients.

use serde::{Deserialize, Serialize};

use super::http::RelayStateDto;

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    State,
    Relays,
    FirmwareStaged,
}

/// Periodic snapshot of the controller state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotMessage {
    pub r#type: MessageType,
    pub relays: RelayStateDto,
    /// Number of connected dashboard clients
    pub clients: usize,
    pub uptime_ms: u64,
    /// Unix timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

/// Relay state after an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaysChangedMessage {
    pub r#type: MessageType,
    pub relays: RelayStateDto,
}

/// Firmware image staged, sent to access-point clients only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareStagedMessage {
    pub r#type: MessageType,
    pub bytes: usize,
    pub staged_at: i64,
}
