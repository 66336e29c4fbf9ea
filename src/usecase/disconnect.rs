//! UseCase: 参加者切断処理
//!
//! メンバーの削除・ホストフェイルオーバー・ルーム破棄は Room Store の
//! 1 回のクリティカルセクションで完結しており、このユースケースは
//! その結果をミラーへ反映して通知用の情報を返します。

use std::sync::Arc;

use crate::domain::{ConnectionId, DepartureOutcome, RoomMirror, RoomStore};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
    /// Room Mirror（永続ミラーの抽象化）
    mirror: Arc<dyn RoomMirror>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>, mirror: Arc<dyn RoomMirror>) -> Self {
        Self { store, mirror }
    }

    /// 参加者切断を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 切断した接続 ID
    ///
    /// # Returns
    ///
    /// * `Some(DepartureOutcome)` - 離脱したルームと通知用の事後情報
    /// * `None` - どのルームにも属していなかった
    pub async fn execute(&self, connection: &ConnectionId) -> Option<DepartureOutcome> {
        // 1. Store から削除（フェイルオーバー・破棄も同一クリティカル
        //    セクション内で完了している）
        let outcome = self.store.remove_member(connection).await?;

        // 2. ミラーへ反映（失敗しても続行）
        if let Err(e) = self.mirror.member_left(connection).await {
            tracing::warn!("Failed to mirror member departure: {}", e);
        }
        if outcome.destroyed {
            if let Err(e) = self.mirror.room_destroyed(&outcome.code).await {
                tracing::warn!("Failed to mirror room destruction for '{}': {}", outcome.code, e);
            }
        } else if let Some(new_host) = &outcome.promoted {
            if let Err(e) = self.mirror.host_changed(&outcome.code, new_host).await {
                tracing::warn!("Failed to mirror host change for '{}': {}", outcome.code, e);
            }
        }

        Some(outcome)
    }
}
