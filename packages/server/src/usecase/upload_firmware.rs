//! UseCase: ファームウェアアップロード処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UploadFirmwareUseCase::execute() / confirm_running_image() メソッド
//!
//! ### なぜこのテストが必要か
//! - 空のイメージが書き込み処理に到達しないことを保証
//! - 書き込み側の失敗が呼び出し元に伝わることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：イメージのステージ、起動時の確定
//! - 異常系：空のイメージ、書き込みの拒否
//!
//! アクセス制御（AP サブネットからの接続のみ許可）は UI 層で行います。

use std::sync::Arc;

use crate::domain::{FirmwareImage, FirmwareUpdater, StagedFirmware};

use super::error::FirmwareUploadError;

/// ファームウェアアップロードのユースケース
pub struct UploadFirmwareUseCase {
    /// ファームウェア書き込み（OTA パーティションの抽象化）
    firmware: Arc<dyn FirmwareUpdater>,
}

impl UploadFirmwareUseCase {
    /// 新しい UploadFirmwareUseCase を作成
    pub fn new(firmware: Arc<dyn FirmwareUpdater>) -> Self {
        Self { firmware }
    }

    /// 受信したイメージをステージ
    ///
    /// # Arguments
    ///
    /// * `bytes` - 受信したイメージ全体
    ///
    /// # Returns
    ///
    /// * `Ok(StagedFirmware)` - 書き込んだバイト数と時刻
    /// * `Err(FirmwareUploadError)` - 空のイメージ、または書き込み失敗
    pub async fn execute(&self, bytes: Vec<u8>) -> Result<StagedFirmware, FirmwareUploadError> {
        let image = FirmwareImage::new(bytes)?;
        let staged = self.firmware.stage(image).await.inspect_err(|e| {
            tracing::error!("Firmware staging failed: {}", e);
        })?;
        Ok(staged)
    }

    /// 起動時に実行中のイメージを有効として確定
    pub async fn confirm_running_image(&self) -> Result<(), FirmwareUploadError> {
        self.firmware.confirm_running_image().await?;
        Ok(())
    }
}
