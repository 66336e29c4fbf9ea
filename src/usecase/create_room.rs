//! UseCase: ルーム作成処理
//!
//! 作成者をホストとして新しいルームを確保し、ミラーへルーム行と
//! ホストのメンバー行を書き込みます。

use std::sync::Arc;

use crate::domain::{ConnectionId, DisplayName, RoomMirror, RoomSnapshot, RoomStore};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
    /// Room Mirror（永続ミラーの抽象化）
    mirror: Arc<dyn RoomMirror>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>, mirror: Arc<dyn RoomMirror>) -> Self {
        Self { store, mirror }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 作成者の接続 ID（ホストになる）
    /// * `display_name` - 作成者の表示名
    ///
    /// # Returns
    ///
    /// 作成直後のルームのスナップショット
    pub async fn execute(
        &self,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> RoomSnapshot {
        // 1. Store でルームを確保（コードの衝突回避は Store の責務）
        let snapshot = self
            .store
            .create_room(connection.clone(), display_name)
            .await;

        // 2. ミラーへ反映（失敗してもインメモリ状態はそのまま）
        if let Err(e) = self
            .mirror
            .room_created(&snapshot.code, &connection, snapshot.created_at)
            .await
        {
            tracing::warn!("Failed to mirror room creation for '{}': {}", snapshot.code, e);
        }
        if let Some(host) = snapshot.members.first() {
            if let Err(e) = self
                .mirror
                .member_joined(
                    &snapshot.code,
                    &connection,
                    &host.display_name,
                    true,
                    host.joined_at,
                )
                .await
            {
                tracing::warn!("Failed to mirror host member for '{}': {}", snapshot.code, e);
            }
        }

        snapshot
    }
}
