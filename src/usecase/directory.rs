//! UseCase: ルーム一覧・詳細の読み取り
//!
//! HTTP 診断エンドポイント用の読み取り専用ビュー。ルーム状態は一切
//! 変更しません。

use std::sync::Arc;

use crate::domain::{RoomCode, RoomSnapshot, RoomStore};

/// ルーム一覧・詳細取得のユースケース
pub struct RoomDirectoryUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
}

impl RoomDirectoryUseCase {
    /// 新しい RoomDirectoryUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 常駐ルームのスナップショット一覧を取得（コード順）
    pub async fn summaries(&self) -> Vec<RoomSnapshot> {
        self.store.room_summaries().await
    }

    /// 指定コードのルームのスナップショットを取得
    pub async fn detail(&self, code: &RoomCode) -> Option<RoomSnapshot> {
        self.store.room_detail(code).await
    }
}
