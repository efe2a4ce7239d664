//! InMemory Client Repository 実装
//!
//! ドメイン層が定義する ClientRepository trait の具体的な実装。
//! 固定長スロットの `ClientRegistry` を単一の Mutex で保護します。
//!
//! ロックは各操作の間だけ保持し、ネットワーク送信中は保持しません。
//! 送信側（BroadcastDispatcher）は `snapshot()` のコピーを使って送信します。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ClientRegistry, ClientRepository, ConnectionHandle, RegistryError, SocketId};

/// インメモリ Client Repository 実装
pub struct InMemoryClientRepository {
    /// 接続中クライアントのレジストリ
    registry: Arc<Mutex<ClientRegistry>>,
    /// レジストリの容量（不変のためロック外に保持）
    capacity: usize,
}

impl InMemoryClientRepository {
    /// 新しい InMemoryClientRepository を作成
    pub fn new(registry: ClientRegistry) -> Self {
        let capacity = registry.capacity();
        Self {
            registry: Arc::new(Mutex::new(registry)),
            capacity,
        }
    }

    /// 指定した容量の空のレジストリで InMemoryClientRepository を作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(ClientRegistry::with_capacity(capacity))
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn add(&self, handle: ConnectionHandle) -> Result<(), RegistryError> {
        let mut registry = self.registry.lock().await;
        registry.add(handle)
    }

    async fn remove(&self, id: SocketId) -> Option<ConnectionHandle> {
        let mut registry = self.registry.lock().await;
        registry.remove(id)
    }

    async fn snapshot(&self) -> Vec<ConnectionHandle> {
        let registry = self.registry.lock().await;
        registry.snapshot()
    }

    async fn clear(&self) -> Vec<ConnectionHandle> {
        let mut registry = self.registry.lock().await;
        registry.clear()
    }

    async fn count(&self) -> usize {
        let registry = self.registry.lock().await;
        registry.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
