//! UseCase: ルーム参加処理
//!
//! 常駐していないコードへの参加だけが唯一、要求元へエラーが返る操作
//! （join-error）。成立した場合はキャッチアップ用のスナップショットを
//! 返し、ミラーへメンバー行を書き込みます。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DisplayName, RoomCode, RoomMirror, RoomSnapshot, RoomStore, SyncError,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
    /// Room Mirror（永続ミラーの抽象化）
    mirror: Arc<dyn RoomMirror>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>, mirror: Arc<dyn RoomMirror>) -> Self {
        Self { store, mirror }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `raw_code` - クライアントが入力したルームコード（形式不正も
    ///   「ルームが見つからない」として扱う）
    /// * `connection` - 参加者の接続 ID
    /// * `display_name` - 参加者の表示名
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 参加成立、キャッチアップ用スナップショット
    /// * `Err(SyncError::RoomNotFound)` - コードが常駐していない
    pub async fn execute(
        &self,
        raw_code: &str,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> Result<RoomSnapshot, SyncError> {
        // 1. コードの解釈（形式不正は未知のコードと同じ扱い）
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| SyncError::RoomNotFound(raw_code.to_string()))?;

        // 2. Store へ参加
        let snapshot = self
            .store
            .join_room(&code, connection.clone(), display_name)
            .await?;

        // 3. ミラーへメンバー行を反映（失敗しても続行）
        if let Some(member) = snapshot
            .members
            .iter()
            .find(|m| m.connection_id == connection)
        {
            if let Err(e) = self
                .mirror
                .member_joined(
                    &snapshot.code,
                    &connection,
                    &member.display_name,
                    false,
                    member.joined_at,
                )
                .await
            {
                tracing::warn!("Failed to mirror member join for '{}': {}", snapshot.code, e);
            }
        }

        Ok(snapshot)
    }
}
