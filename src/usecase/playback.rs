//! UseCase: 再生クロック操作
//!
//! load-video / play / pause / heartbeat / toggle-background-play を
//! まとめて扱います。いずれもホスト専用で、非ホストからの呼び出しは
//! `NotAuthorized` として呼び出し側で黙って破棄されます。
//!
//! ハートビートだけはミラーへ書き込みません（最も高頻度なイベントで
//! あり、ミラーは診断用の best-effort スナップショットに過ぎないため）。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, HeartbeatView, PlaybackView, RoomMirror, RoomStore, SyncError,
};

/// 再生クロック操作のユースケース
pub struct ControlPlaybackUseCase {
    /// Room Store（ルームテーブルの抽象化）
    store: Arc<dyn RoomStore>,
    /// Room Mirror（永続ミラーの抽象化）
    mirror: Arc<dyn RoomMirror>,
}

impl ControlPlaybackUseCase {
    /// 新しい ControlPlaybackUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>, mirror: Arc<dyn RoomMirror>) -> Self {
        Self { store, mirror }
    }

    /// 動画をロードする（ホストのみ）
    ///
    /// 再生位置は与えられた値（省略時 0）になり、一時停止状態になる。
    pub async fn load_video(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        position: f64,
    ) -> Result<PlaybackView, SyncError> {
        let playback = self.store.load_video(connection, video_ref, position).await?;
        self.mirror_playback(&playback).await;
        Ok(playback)
    }

    /// 再生を開始する（ホストのみ）
    pub async fn play(
        &self,
        connection: &ConnectionId,
        position: f64,
    ) -> Result<PlaybackView, SyncError> {
        let playback = self.store.set_transport(connection, position, true).await?;
        self.mirror_playback(&playback).await;
        Ok(playback)
    }

    /// 再生を一時停止する（ホストのみ）
    pub async fn pause(
        &self,
        connection: &ConnectionId,
        position: f64,
    ) -> Result<PlaybackView, SyncError> {
        let playback = self.store.set_transport(connection, position, false).await?;
        self.mirror_playback(&playback).await;
        Ok(playback)
    }

    /// ハートビートの位置スナップショット（ホストのみ、ミラーなし）
    pub async fn heartbeat(
        &self,
        connection: &ConnectionId,
        position: f64,
    ) -> Result<HeartbeatView, SyncError> {
        self.store.record_heartbeat(connection, position).await
    }

    /// バックグラウンド再生を切り替える（ホストのみ）
    pub async fn set_background_play(
        &self,
        connection: &ConnectionId,
        enabled: bool,
    ) -> Result<PlaybackView, SyncError> {
        let playback = self.store.set_background_play(connection, enabled).await?;
        self.mirror_playback(&playback).await;
        Ok(playback)
    }

    async fn mirror_playback(&self, playback: &PlaybackView) {
        if let Err(e) = self.mirror.playback_updated(playback).await {
            tracing::warn!(
                "Failed to mirror playback state for '{}': {}",
                playback.code,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RoomStore;
    use crate::usecase::test_support::{conn, create_null_mirror, create_test_store, name};

    async fn setup() -> (Arc<crate::infrastructure::InMemoryRoomStore>, ControlPlaybackUseCase)
    {
        let store = create_test_store();
        let usecase = ControlPlaybackUseCase::new(store.clone(), create_null_mirror());
        (store, usecase)
    }

    #[tokio::test]
    async fn test_load_video_pauses_at_given_position() {
        // テスト項目: 動画ロードで位置が設定され一時停止になる
        // given (前提条件):
        let (store, usecase) = setup().await;
        let host = conn("host");
        store.create_room(host.clone(), name("alice")).await;

        // when (操作):
        let playback = usecase
            .load_video(&host, "v1".to_string(), 12.5)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(playback.video_ref, "v1");
        assert_eq!(playback.playback_position, 12.5);
        assert!(!playback.is_playing);
    }

    #[tokio::test]
    async fn test_play_and_pause_set_transport_state() {
        // テスト項目: play / pause が位置と再生状態を設定する
        // given (前提条件):
        let (store, usecase) = setup().await;
        let host = conn("host");
        store.create_room(host.clone(), name("alice")).await;
        usecase
            .load_video(&host, "v1".to_string(), 0.0)
            .await
            .unwrap();

        // when (操作):
        let playing = usecase.play(&host, 30.0).await.unwrap();
        let paused = usecase.pause(&host, 31.5).await.unwrap();

        // then (期待する結果):
        assert!(playing.is_playing);
        assert_eq!(playing.playback_position, 30.0);
        assert!(!paused.is_playing);
        assert_eq!(paused.playback_position, 31.5);
    }

    #[tokio::test]
    async fn test_heartbeat_keeps_playing_state() {
        // テスト項目: ハートビートが再生状態を保ったまま位置を更新する
        // given (前提条件):
        let (store, usecase) = setup().await;
        let host = conn("host");
        store.create_room(host.clone(), name("alice")).await;
        usecase.play(&host, 10.0).await.unwrap();

        // when (操作):
        let view = usecase.heartbeat(&host, 42.5).await.unwrap();

        // then (期待する結果):
        assert!(view.is_playing);
    }

    #[tokio::test]
    async fn test_non_host_is_rejected() {
        // テスト項目: 非ホストの操作が NotAuthorized になる
        // given (前提条件):
        let (store, usecase) = setup().await;
        let host = conn("host");
        let follower = conn("follower");
        let snapshot = store.create_room(host.clone(), name("alice")).await;
        store
            .join_room(&snapshot.code, follower.clone(), name("bob"))
            .await
            .unwrap();

        // when (操作):
        let result = usecase.load_video(&follower, "v9".to_string(), 0.0).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), SyncError::NotAuthorized);
    }

    #[tokio::test]
    async fn test_toggle_background_play() {
        // テスト項目: バックグラウンド再生フラグが切り替わる
        // given (前提条件):
        let (store, usecase) = setup().await;
        let host = conn("host");
        store.create_room(host.clone(), name("alice")).await;

        // when (操作):
        let enabled = usecase.set_background_play(&host, true).await.unwrap();
        let disabled = usecase.set_background_play(&host, false).await.unwrap();

        // then (期待する結果):
        assert!(enabled.background_play);
        assert!(!disabled.background_play);
    }
}
