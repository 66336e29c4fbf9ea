//! UseCase: チャットメッセージ中継
//!
//! 任意のメンバーが送信でき、ルーム状態には何も保存しません。
//! trim 後に空になったメッセージと、どのルームにも属さない接続からの
//! メッセージは黙って破棄されます。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessageContent, RoomCode, RoomStore, SyncError};

/// 中継するチャットメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRelay {
    pub code: RoomCode,
    pub username: String,
    pub message: String,
}

/// チャットメッセージ中継のユースケース
pub struct SendMessageUseCase {
    /// Room Store（所属ルームの解決に使用）
    store: Arc<dyn RoomStore>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// メッセージ中継を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 送信者の接続 ID
    /// * `raw_message` - クライアントが送った本文（trim 前）
    ///
    /// # Returns
    ///
    /// * `Ok(ChatRelay)` - 中継するルームと送信者情報
    /// * `Err(SyncError::NotAuthorized)` - どのルームにも属していない
    /// * `Err(SyncError::EmptyMessage)` - trim 後に空
    pub async fn execute(
        &self,
        connection: &ConnectionId,
        raw_message: String,
    ) -> Result<ChatRelay, SyncError> {
        // 1. 所属ルームの解決
        let context = self
            .store
            .member_context(connection)
            .await
            .ok_or(SyncError::NotAuthorized)?;

        // 2. 本文の検証（trim して空なら破棄）
        let content =
            MessageContent::new(raw_message).map_err(|_| SyncError::EmptyMessage)?;

        Ok(ChatRelay {
            code: context.code,
            username: context.display_name,
            message: content.into_string(),
        })
    }
}
