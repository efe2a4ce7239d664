//! In-memory firmware slot.
//!
//! Keeps the last staged image in memory instead of writing an OTA
//! partition. Used on hosts and in tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use boatdash_shared::time::now_millis;
use tokio::sync::Mutex;

use crate::domain::{FirmwareError, FirmwareImage, FirmwareUpdater, StagedFirmware, Timestamp};

/// Firmware updater backed by memory
#[derive(Debug, Default)]
pub struct InMemoryFirmwareSlot {
    staged: Mutex<Option<FirmwareImage>>,
    running_confirmed: AtomicBool,
}

impl InMemoryFirmwareSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the staged image, if any
    pub async fn staged_len(&self) -> Option<usize> {
        self.staged.lock().await.as_ref().map(FirmwareImage::len)
    }

    /// Whether the running image has been confirmed since start
    pub fn is_running_confirmed(&self) -> bool {
        self.running_confirmed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FirmwareUpdater for InMemoryFirmwareSlot {
    async fn stage(&self, image: FirmwareImage) -> Result<StagedFirmware, FirmwareError> {
        let bytes = image.len();
        *self.staged.lock().await = Some(image);
        tracing::info!("Staged firmware image ({} bytes) for next boot", bytes);
        Ok(StagedFirmware {
            bytes,
            staged_at: Timestamp::new(now_millis()),
        })
    }

    async fn confirm_running_image(&self) -> Result<(), FirmwareError> {
        if !self.running_confirmed.swap(true, Ordering::SeqCst) {
            tracing::info!("Running firmware image marked valid");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stage_keeps_image() {
        // テスト項目: ステージしたイメージのサイズが記録される
        // given (前提条件):
        let slot = InMemoryFirmwareSlot::new();
        let image = FirmwareImage::new(vec![0xe9; 1024]).unwrap();

        // when (操作):
        let staged = slot.stage(image).await.unwrap();

        // then (期待する結果):
        assert_eq!(staged.bytes, 1024);
        assert_eq!(slot.staged_len().await, Some(1024));
    }

    #[tokio::test]
    async fn test_confirm_running_image_is_idempotent() {
        // テスト項目: 起動時の確定処理は何度呼んでも成功する
        // given (前提条件):
        let slot = InMemoryFirmwareSlot::new();
        assert!(!slot.is_running_confirmed());

        // when (操作):
        slot.confirm_running_image().await.unwrap();
        slot.confirm_running_image().await.unwrap();

        // then (期待する結果):
        assert!(slot.is_running_confirmed());
    }
}
