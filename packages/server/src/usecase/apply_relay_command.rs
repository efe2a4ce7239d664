//! UseCase: リレーコマンド適用処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ApplyRelayCommandUseCase::execute() メソッド
//! - コマンド本文の検証とリレー制御への委譲
//!
//! ### なぜこのテストが必要か
//! - 構造的に不正なコマンドがリレー制御に到達しないことを保証
//! - リレー制御側の失敗が呼び出し元に伝わることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：有効なコマンドの適用
//! - 異常系：JSON でない本文、未知のリレー名、真偽値でない値、リレー制御の失敗

use std::sync::Arc;

use crate::domain::{RelayCommand, RelayController, RelayState};

use super::error::RelayCommandError;

/// リレーコマンド適用のユースケース
pub struct ApplyRelayCommandUseCase {
    /// リレー制御（ハードウェア層の抽象化）
    relays: Arc<dyn RelayController>,
}

impl ApplyRelayCommandUseCase {
    /// 新しい ApplyRelayCommandUseCase を作成
    pub fn new(relays: Arc<dyn RelayController>) -> Self {
        Self { relays }
    }

    /// コマンド本文を検証して適用
    ///
    /// # Arguments
    ///
    /// * `body` - 受信したコマンド本文（全体）
    ///
    /// # Returns
    ///
    /// * `Ok(RelayState)` - 適用後のリレー状態
    /// * `Err(RelayCommandError::Invalid)` - 本文が不正（リレー制御は呼ばれない）
    /// * `Err(RelayCommandError::Relay)` - リレー制御での失敗
    pub async fn execute(&self, body: &[u8]) -> Result<RelayState, RelayCommandError> {
        let command = RelayCommand::parse(body).inspect_err(|e| {
            tracing::warn!("Rejected relay command ({} bytes): {}", body.len(), e);
        })?;

        let state = self.relays.apply(&command).await.inspect_err(|e| {
            tracing::error!("Relay command failed: {}", e);
        })?;
        tracing::info!(
            "Relay command applied: nav={} all={} spot={}",
            state.nav,
            state.all,
            state.spot
        );
        Ok(state)
    }

    /// 現在のリレー状態を取得
    pub async fn current(&self) -> RelayState {
        self.relays.state().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommandError, MockRelayController, RelayError, RelayName};

    #[tokio::test]
    async fn test_apply_relay_command_success() {
        // テスト項目: 有効なコマンドはリレー制御に渡され、適用後の状態が返される
        // given (前提条件):
        let mut relays = MockRelayController::new();
        relays
            .expect_apply()
            .withf(|command| command.settings() == [(RelayName::Spot, true)])
            .times(1)
            .returning(|command| Ok(RelayState::default().applied(command)));
        let usecase = ApplyRelayCommandUseCase::new(Arc::new(relays));

        // when (操作):
        let result = usecase.execute(br#"{"spot":true}"#).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(RelayState {
                nav: false,
                all: false,
                spot: true
            })
        );
    }

    #[tokio::test]
    async fn test_apply_relay_command_invalid_body_never_reaches_relays() {
        // テスト項目: 不正な本文はリレー制御を呼ばずにエラーになる
        // given (前提条件):
        let mut relays = MockRelayController::new();
        relays.expect_apply().never();
        let usecase = ApplyRelayCommandUseCase::new(Arc::new(relays));

        // when (操作):
        let not_json = usecase.execute(b"spot=on").await;
        let empty = usecase.execute(b"{}").await;
        let unknown = usecase.execute(br#"{"anchor":true}"#).await;
        let not_bool = usecase.execute(br#"{"nav":"yes"}"#).await;

        // then (期待する結果):
        assert!(matches!(
            not_json,
            Err(RelayCommandError::Invalid(CommandError::Malformed(_)))
        ));
        assert_eq!(empty, Err(RelayCommandError::Invalid(CommandError::Empty)));
        assert!(matches!(
            unknown,
            Err(RelayCommandError::Invalid(CommandError::UnknownRelay(_)))
        ));
        assert_eq!(
            not_bool,
            Err(RelayCommandError::Invalid(CommandError::NotBoolean {
                relay: "nav".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn test_apply_relay_command_hardware_failure() {
        // テスト項目: リレー制御の失敗は Relay エラーとして返される
        // given (前提条件):
        let mut relays = MockRelayController::new();
        relays
            .expect_apply()
            .times(1)
            .returning(|_| Err(RelayError::Hardware("gpio write failed".to_string())));
        let usecase = ApplyRelayCommandUseCase::new(Arc::new(relays));

        // when (操作):
        let result = usecase.execute(br#"{"nav":true}"#).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RelayCommandError::Relay(RelayError::Hardware(
                "gpio write failed".to_string()
            )))
        );
    }
}
