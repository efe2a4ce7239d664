//! UseCase: クライアント登録処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RegisterClientUseCase::execute() メソッド
//! - WebSocket アップグレード時のレジストリ登録
//!
//! ### なぜこのテストが必要か
//! - レジストリ容量はハードリミットであり、満杯時は既存クライアントを
//!   追い出さずに新規接続を拒否する必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規クライアントの登録
//! - 異常系：容量超過
//! - エッジケース：同じソケット ID の再登録（no-op）

use std::sync::Arc;

use crate::domain::{ClientRepository, ConnectionHandle, RegistryError};

use super::error::RegisterError;

/// クライアント登録のユースケース
pub struct RegisterClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClientRepository>,
}

impl RegisterClientUseCase {
    /// 新しい RegisterClientUseCase を作成
    pub fn new(repository: Arc<dyn ClientRepository>) -> Self {
        Self { repository }
    }

    /// クライアント登録を実行
    ///
    /// 登録はハンドシェイク完了前に行われるため、ハンドルの状態は
    /// Connecting のままです。Upgraded への遷移はソケット側で行います。
    ///
    /// # Arguments
    ///
    /// * `handle` - 登録する接続ハンドル
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 登録成功（登録済みの場合も成功）
    /// * `Err(RegisterError::CapacityExceeded)` - レジストリが満杯
    pub async fn execute(&self, handle: ConnectionHandle) -> Result<(), RegisterError> {
        let id = handle.id;
        match self.repository.add(handle).await {
            Ok(()) => {
                tracing::info!(
                    "Client {} registered (capacity {})",
                    id,
                    self.repository.capacity()
                );
                Ok(())
            }
            Err(RegistryError::CapacityExceeded { capacity, .. }) => {
                tracing::warn!("Client {} rejected: registry full ({})", id, capacity);
                Err(RegisterError::CapacityExceeded { capacity })
            }
        }
    }
}
