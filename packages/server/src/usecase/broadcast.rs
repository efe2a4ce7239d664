//! UseCase: ブロードキャスト配信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastDispatcher::broadcast() / dispatch() メソッド
//! - 登録済み全クライアントへの配信と、送信失敗時の自動登録解除
//! - BroadcastQueue による配信順序の保証
//!
//! ### なぜこのテストが必要か
//! - 1 クライアントの失敗が他のクライアントへの配信を妨げないことを保証
//! - 送信に失敗したクライアントが配信直後にレジストリから消えていることを保証
//! - リレー状態のように順序に意味のあるペイロードが入れ替わらないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：k クライアントへちょうど k 回の送信
//! - 異常系：切断済みクライアント、キューが詰まったクライアント
//! - エッジケース：クライアント 0 件、AP 内クライアント限定の配信

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use tokio::sync::mpsc::{self, error::SendTimeoutError};

use crate::domain::{
    AccessGuard, BroadcastPayload, ClientRepository, CloseReason, ConnectionHandle, SocketId,
};

use super::unregister_client::UnregisterClientUseCase;

/// Default time a single recipient may hold up a broadcast
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(1);

/// Payloads waiting for the publishing task
const PUBLISH_QUEUE: usize = 64;

/// 配信先の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// 登録済みの全クライアント
    Everyone,
    /// AP サブネットから接続しているクライアントのみ
    AccessPointOnly,
}

/// 1 回の配信結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信を試みたクライアント数
    pub attempted: usize,
    /// ペイロード全体をキューに渡せたクライアント数
    pub delivered: usize,
    /// 送信失敗により登録解除したクライアント
    pub evicted: Vec<SocketId>,
}

/// ブロードキャスト配信のユースケース
///
/// レジストリの snapshot を取ってからロック外で送信します。
/// 送信はクライアントごとに独立しており、失敗したクライアントは
/// 登録解除して残りへの配信を続けます。同一呼び出し内での再送はしません。
pub struct BroadcastDispatcher {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ClientRepository>,
    /// 配信先を限定する場合に使う Access Guard
    guard: AccessGuard,
    /// クライアント 1 件あたりの送信タイムアウト
    send_timeout: Duration,
}

impl BroadcastDispatcher {
    /// 新しい BroadcastDispatcher を作成
    pub fn new(
        repository: Arc<dyn ClientRepository>,
        guard: AccessGuard,
        send_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            guard,
            send_timeout,
        }
    }

    /// 全クライアントへ配信（fire-and-forget）
    pub async fn broadcast(&self, payload: BroadcastPayload) {
        self.dispatch(payload, Audience::Everyone).await;
    }

    /// 配信先を指定して配信
    ///
    /// # Returns
    ///
    /// 送信試行数・成功数・登録解除したクライアントの一覧
    pub async fn dispatch(&self, payload: BroadcastPayload, audience: Audience) -> BroadcastReport {
        let recipients: Vec<ConnectionHandle> = self
            .repository
            .snapshot()
            .await
            .into_iter()
            .filter(|handle| self.admits(audience, handle))
            .collect();

        if recipients.is_empty() {
            return BroadcastReport::default();
        }

        // 各クライアントへの送信は並行に行い、遅いクライアントが他を待たせないようにする
        let sends = recipients.iter().map(|handle| {
            let payload = payload.clone();
            async move {
                let result = handle.sender().send_timeout(payload, self.send_timeout).await;
                (handle.id, result)
            }
        });
        let results = join_all(sends).await;

        let mut report = BroadcastReport {
            attempted: results.len(),
            ..BroadcastReport::default()
        };
        let unregister = UnregisterClientUseCase::new(self.repository.clone());
        for (id, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    let cause = match e {
                        SendTimeoutError::Timeout(_) => "timed out",
                        SendTimeoutError::Closed(_) => "connection closed",
                    };
                    tracing::warn!("Broadcast to client {} failed: {}", id, cause);
                    unregister.execute(id, CloseReason::SendFailed).await;
                    report.evicted.push(id);
                }
            }
        }

        tracing::debug!(
            "Broadcast {} bytes: {}/{} delivered",
            payload.len(),
            report.delivered,
            report.attempted
        );
        report
    }

    fn admits(&self, audience: Audience, handle: &ConnectionHandle) -> bool {
        match audience {
            Audience::Everyone => true,
            Audience::AccessPointOnly => self.guard.classify(handle.peer).is_local(),
        }
    }
}

/// 配信順序を保つ送信キュー
///
/// 単一のタスクがキューを取り出して `dispatch` を順に await するため、
/// `publish` を呼んだ順にクライアントへ届きます。呼び出し側は
/// 状態の変更と `publish` を同じロックの中で行うことで、変更順と配信順を揃えます。
#[derive(Clone)]
pub struct BroadcastQueue {
    tx: mpsc::Sender<(BroadcastPayload, Audience)>,
}

impl BroadcastQueue {
    /// 配信タスクを起動して BroadcastQueue を作成
    ///
    /// Tokio ランタイム内で呼び出す必要があります。すべての BroadcastQueue が
    /// drop されるとタスクは終了します。
    pub fn spawn(dispatcher: Arc<BroadcastDispatcher>) -> Self {
        let (tx, mut rx) = mpsc::channel::<(BroadcastPayload, Audience)>(PUBLISH_QUEUE);
        tokio::spawn(async move {
            while let Some((payload, audience)) = rx.recv().await {
                dispatcher.dispatch(payload, audience).await;
            }
            tracing::debug!("Broadcast queue closed");
        });
        Self { tx }
    }

    /// ペイロードを配信キューに積む
    pub async fn publish(&self, payload: BroadcastPayload, audience: Audience) {
        if self.tx.send((payload, audience)).await.is_err() {
            tracing::warn!("Broadcast queue is closed, payload dropped");
        }
    }
}
