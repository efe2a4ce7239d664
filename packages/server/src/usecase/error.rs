//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{CommandError, FirmwareError, RelayError};

/// クライアント登録のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// レジストリが満杯
    #[error("Client registry is full ({capacity} connections)")]
    CapacityExceeded { capacity: usize },
}

/// リレーコマンド適用のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayCommandError {
    /// コマンドが構造的に不正
    #[error(transparent)]
    Invalid(#[from] CommandError),

    /// リレー制御側での失敗
    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// ファームウェアアップロードのエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FirmwareUploadError {
    #[error(transparent)]
    Firmware(#[from] FirmwareError),
}
