//! Ports implemented by the infrastructure layer.
//!
//! The domain defines these traits; infrastructure provides the
//! implementations and usecases depend only on the traits.

use async_trait::async_trait;

use super::{
    entity::{ConnectionHandle, FirmwareImage, RelayCommand, RelayState, StagedFirmware},
    error::{FirmwareError, RegistryError, RelayError},
    value_object::SocketId,
};

/// Shared store of live connection handles.
///
/// Every method takes the registry lock for the duration of the call only.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Register a handle; a duplicate socket id is a no-op
    async fn add(&self, handle: ConnectionHandle) -> Result<(), RegistryError>;

    /// Remove a handle, returning it if it was registered
    async fn remove(&self, id: SocketId) -> Option<ConnectionHandle>;

    /// Point-in-time copy of every registered handle
    async fn snapshot(&self) -> Vec<ConnectionHandle>;

    /// Remove and return every handle
    async fn clear(&self) -> Vec<ConnectionHandle>;

    /// Number of registered handles
    async fn count(&self) -> usize;

    /// Maximum number of handles
    fn capacity(&self) -> usize;
}

/// Relay-control collaborator driving the actuator hardware.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelayController: Send + Sync {
    /// Apply a validated command, returning the resulting relay state
    async fn apply(&self, command: &RelayCommand) -> Result<RelayState, RelayError>;

    /// Current relay state
    async fn state(&self) -> RelayState;
}

/// Firmware collaborator writing images to the update partition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FirmwareUpdater: Send + Sync {
    /// Write an image to the inactive slot and select it for the next boot
    async fn stage(&self, image: FirmwareImage) -> Result<StagedFirmware, FirmwareError>;

    /// Mark the running image as valid, cancelling a pending rollback
    async fn confirm_running_image(&self) -> Result<(), FirmwareError>;
}
