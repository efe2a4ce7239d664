//! Infrastructure layer: collaborator implementations and wire DTOs.

pub mod dto;
pub mod firmware;
pub mod relay;
pub mod repository;

pub use firmware::InMemoryFirmwareSlot;
pub use relay::InMemoryRelayBank;
pub use repository::InMemoryClientRepository;
