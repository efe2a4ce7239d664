//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// CIDR string is not of the form `a.b.c.d/len`
    #[error("CIDR must be of the form a.b.c.d/len (got: {0})")]
    CidrInvalidFormat(String),

    /// CIDR prefix length out of range
    #[error("CIDR prefix length cannot exceed {max} (got {actual})")]
    CidrPrefixTooLong { max: u8, actual: u8 },

    /// Relay name is not one of the known relays
    #[error("Unknown relay name: {0}")]
    RelayNameUnknown(String),
}

/// Errors related to the client registry
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Registry capacity exceeded error
    #[error("Client registry full: maximum {capacity} connections allowed (current: {current})")]
    CapacityExceeded { capacity: usize, current: usize },
}

/// Errors raised while validating a relay control command
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Body is not a JSON object
    #[error("Command must be a JSON object: {0}")]
    Malformed(String),

    /// JSON object without any relay entry
    #[error("Command does not name any relay")]
    Empty,

    /// Unknown relay in the command
    #[error(transparent)]
    UnknownRelay(#[from] ValueObjectError),

    /// Relay value is not a boolean
    #[error("Relay '{relay}' must be set to true or false")]
    NotBoolean { relay: String },
}

/// Errors reported by the relay-control collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Actuator refused or failed to switch
    #[error("Relay hardware failure: {0}")]
    Hardware(String),
}

/// Errors reported by the firmware collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FirmwareError {
    /// Uploaded image has no content
    #[error("Firmware image is empty")]
    EmptyImage,

    /// Image could not be written to the update partition
    #[error("Firmware image rejected: {0}")]
    Rejected(String),
}

/// Errors raised by the connection lifecycle state machine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Event not allowed in the current state
    #[error("Invalid connection transition: {event} while {state}")]
    InvalidTransition { state: String, event: String },
}
