//! UseCase: キュー操作
//!
//! add-to-queue / remove-from-queue / play-next / video-ended を扱います。
//! どの変更の後もキューの position は 0 始まりの密な連番であり、前進は
//! 先頭項目を現在の動画にして再生を始めます。
//!
//! キュー変更のたびに、ミラーへは再生フィールドの upsert とキュー行の
//! 全書き直しを行います。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, PlaybackView, QueueAdvance, QueueItem, QueueView, RoomMirror, RoomStore,
    SyncError,
};

/// キュー操作のユースケース
pub struct ManageQueueUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
    /// Room Mirror（永続ミラーの抽象化）
    mirror: Arc<dyn RoomMirror>,
}

impl ManageQueueUseCase {
    /// 新しい ManageQueueUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>, mirror: Arc<dyn RoomMirror>) -> Self {
        Self { store, mirror }
    }

    /// キュー末尾へ追加する（ホストのみ）
    pub async fn add(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        title: String,
    ) -> Result<QueueView, SyncError> {
        let view = self.store.add_to_queue(connection, video_ref, title).await?;
        self.mirror_queue_state(&view.playback, &view.queue).await;
        Ok(view)
    }

    /// 指定 position の項目を取り除く（ホストのみ）
    pub async fn remove(
        &self,
        connection: &ConnectionId,
        position: usize,
    ) -> Result<QueueView, SyncError> {
        let view = self.store.remove_from_queue(connection, position).await?;
        self.mirror_queue_state(&view.playback, &view.queue).await;
        Ok(view)
    }

    /// キュー先頭を現在の動画にする（ホストのみ）
    ///
    /// play-next と video-ended の両方がここに入る。キューが空なら
    /// `EmptyQueue`（状態変更もブロードキャストもなし）。
    pub async fn advance(&self, connection: &ConnectionId) -> Result<QueueAdvance, SyncError> {
        let advance = self.store.advance_queue(connection).await?;
        self.mirror_queue_state(&advance.playback, &advance.queue).await;
        Ok(advance)
    }

    async fn mirror_queue_state(&self, playback: &PlaybackView, queue: &[QueueItem]) {
        if let Err(e) = self.mirror.playback_updated(playback).await {
            tracing::warn!(
                "Failed to mirror playback state for '{}': {}",
                playback.code,
                e
            );
        }
        if let Err(e) = self.mirror.queue_rewritten(&playback.code, queue).await {
            tracing::warn!("Failed to mirror queue for '{}': {}", playback.code, e);
        }
    }
}
