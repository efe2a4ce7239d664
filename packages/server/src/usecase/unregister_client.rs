//! UseCase: クライアント登録解除処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UnregisterClientUseCase::execute() / clear_all() メソッド
//!
//! ### なぜこのテストが必要か
//! - 切断はトランスポートの close と送信失敗の両方から起こり得るため、
//!   二重に呼ばれても安全である必要がある
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みクライアントの解除
//! - エッジケース：既に解除済みのクライアント（false を返す）
//! - 正常系：シャットダウン時の全件解除

use std::sync::Arc;

use crate::domain::{ClientRepository, CloseReason, ConnectionEvent, ConnectionHandle, SocketId};

/// クライアント登録解除のユースケース
pub struct UnregisterClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClientRepository>,
}

impl UnregisterClientUseCase {
    /// 新しい UnregisterClientUseCase を作成
    pub fn new(repository: Arc<dyn ClientRepository>) -> Self {
        Self { repository }
    }

    /// クライアントの登録解除を実行
    ///
    /// 取り除いたハンドルを Closed(reason) に遷移させます。接続側のタスクは
    /// この遷移を受けてソケットを閉じます。
    ///
    /// # Returns
    ///
    /// 登録されていた場合は true
    pub async fn execute(&self, id: SocketId, reason: CloseReason) -> bool {
        match self.repository.remove(id).await {
            Some(handle) => {
                close(&handle, reason);
                true
            }
            None => {
                tracing::debug!("Client {} already unregistered ({})", id, reason);
                false
            }
        }
    }

    /// 全クライアントの登録を解除（シャットダウン時）
    ///
    /// # Returns
    ///
    /// 解除したクライアント数
    pub async fn clear_all(&self) -> usize {
        let cleared = self.repository.clear().await;
        for handle in &cleared {
            close(handle, CloseReason::Cleared);
        }
        cleared.len()
    }
}

fn close(handle: &ConnectionHandle, reason: CloseReason) {
    let previous = handle.lifecycle().current();
    match handle.lifecycle().apply(ConnectionEvent::Closed(reason)) {
        Ok(state) => {
            tracing::info!(
                "Client {} unregistered: {:?} -> {:?}",
                handle.id,
                previous,
                state
            )
        }
        Err(e) => tracing::warn!("Client {} unregistered: {}", handle.id, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionState, Timestamp},
        infrastructure::repository::InMemoryClientRepository,
    };
    use tokio::sync::mpsc;

    fn handle(id: u64) -> ConnectionHandle {
        let (tx, _rx) = mpsc::channel(1);
        ConnectionHandle::new(SocketId::new(id), None, Timestamp::new(0), tx)
    }

    #[tokio::test]
    async fn test_unregister_client_success() {
        // テスト項目: 登録済みクライアントを解除できる
        // given (前提条件):
        let repository = Arc::new(InMemoryClientRepository::with_capacity(4));
        repository.add(handle(1)).await.unwrap();
        repository.add(handle(2)).await.unwrap();
        let usecase = UnregisterClientUseCase::new(repository.clone());

        // when (操作):
        let result = usecase
            .execute(SocketId::new(1), CloseReason::TransportClosed)
            .await;

        // then (期待する結果):
        assert!(result);
        assert_eq!(repository.count().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_client_twice() {
        // テスト項目: 二重の解除は false を返し、エラーにならない
        // given (前提条件): 送信失敗で既に解除されている
        let repository = Arc::new(InMemoryClientRepository::with_capacity(4));
        let evicted = handle(1);
        let lifecycle = evicted.lifecycle().clone();
        repository.add(evicted).await.unwrap();
        let usecase = UnregisterClientUseCase::new(repository.clone());
        usecase
            .execute(SocketId::new(1), CloseReason::SendFailed)
            .await;

        // when (操作): トランスポート側からも切断が通知される
        let result = usecase
            .execute(SocketId::new(1), CloseReason::TransportClosed)
            .await;

        // then (期待する結果): 最初の理由が残る
        assert!(!result);
        assert_eq!(repository.count().await, 0);
        assert_eq!(
            lifecycle.current(),
            ConnectionState::Closed(CloseReason::SendFailed)
        );
    }

    #[tokio::test]
    async fn test_clear_all() {
        // テスト項目: 全クライアントの登録を一括で解除できる
        // given (前提条件):
        let repository = Arc::new(InMemoryClientRepository::with_capacity(4));
        let mut lifecycles = Vec::new();
        for id in 1..=3 {
            let handle = handle(id);
            lifecycles.push(handle.lifecycle().clone());
            repository.add(handle).await.unwrap();
        }
        let usecase = UnregisterClientUseCase::new(repository.clone());

        // when (操作):
        let cleared = usecase.clear_all().await;

        // then (期待する結果):
        assert_eq!(cleared, 3);
        assert_eq!(repository.count().await, 0);
        for lifecycle in &lifecycles {
            assert_eq!(
                lifecycle.current(),
                ConnectionState::Closed(CloseReason::Cleared)
            );
        }
    }
}
