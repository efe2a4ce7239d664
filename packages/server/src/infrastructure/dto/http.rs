//! HTTP API response DTOs for the UI gateway.

use serde::{Deserialize, Serialize};

use crate::domain::{RelayState, StagedFirmware};

/// Relay state body for `GET/POST /api/relays`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStateDto {
    pub nav: bool,
    pub all: bool,
    pub spot: bool,
}

impl From<RelayState> for RelayStateDto {
    fn from(state: RelayState) -> Self {
        Self {
            nav: state.nav,
            all: state.all,
            spot: state.spot,
        }
    }
}

/// Registry occupancy for `GET /api/clients`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientsDto {
    pub connected: usize,
    pub capacity: usize,
}

/// Result of a firmware upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareStagedDto {
    pub bytes: usize,
    /// Unix timestamp (milliseconds since epoch)
    pub staged_at: i64,
}

impl From<StagedFirmware> for FirmwareStagedDto {
    fn from(staged: StagedFirmware) -> Self {
        Self {
            bytes: staged.bytes,
            staged_at: staged.staged_at.value(),
        }
    }
}
