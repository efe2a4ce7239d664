//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod apply_relay_command;
pub mod broadcast;
pub mod error;
pub mod register_client;
pub mod unregister_client;
pub mod upload_firmware;

pub use apply_relay_command::ApplyRelayCommandUseCase;
pub use broadcast::{
    Audience, BroadcastDispatcher, BroadcastQueue, BroadcastReport, DEFAULT_SEND_TIMEOUT,
};
pub use error::{FirmwareUploadError, RegisterError, RelayCommandError};
pub use register_client::RegisterClientUseCase;
pub use unregister_client::UnregisterClientUseCase;
pub use upload_firmware::UploadFirmwareUseCase;
