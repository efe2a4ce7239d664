//! Domain layer for the UI gateway.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod access_guard;
pub mod entity;
pub mod error;
pub mod factory;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use access_guard::{AccessDenied, AccessGuard, AccessPolicy, Origin, ProtectedOperation};
pub use entity::{
    CloseReason, ConnectionEvent, ConnectionHandle, ConnectionLifecycle, ConnectionState,
    FirmwareImage, RelayCommand, RelayState, StagedFirmware,
};
pub use error::{
    CommandError, ConnectionError, FirmwareError, RegistryError, RelayError, ValueObjectError,
};
pub use factory::SocketIdFactory;
pub use registry::{ClientRegistry, DEFAULT_CLIENT_CAPACITY};
pub use repository::{ClientRepository, FirmwareUpdater, RelayController};
#[cfg(test)]
pub use repository::{MockFirmwareUpdater, MockRelayController};
pub use value_object::{
    BroadcastPayload, DEFAULT_AP_SUBNET, Ipv4Cidr, RelayName, SocketId, Timestamp,
};
