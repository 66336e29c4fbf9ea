//! InMemory Room Store 実装
//!
//! ドメイン層が定義する RoomStore trait の具体的な実装。プロセス内で
//! 唯一の権威あるルームテーブルを所有します。
//!
//! ## 排他制御
//!
//! ルームテーブルと接続→ルームのインデックスは同じ `Mutex` の内側に
//! あり、各メソッドは 1 回のロック取得で完結します。これにより：
//!
//! - 同一ルームへの並行変更が部分的に交錯しない（§ 同期エンジンの要件）
//! - ホスト判定と変更が同じクリティカルセクションで行われる
//! - 切断処理（メンバー削除＋フェイルオーバー＋ルーム破棄）が完了する
//!   まで、そのルームへの後続イベントは処理されない

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::get_unix_timestamp;
use crate::domain::{
    ConnectionId, DepartureOutcome, DisplayName, HeartbeatView, MemberContext, PlaybackView,
    QueueAdvance, QueueView, Room, RoomCode, RoomCodeFactory, RoomSnapshot, RoomStore, SyncError,
    Timestamp,
};

use super::registry::ConnectionRegistry;

#[derive(Default)]
struct StoreInner {
    rooms: HashMap<RoomCode, Room>,
    registry: ConnectionRegistry,
}

impl StoreInner {
    /// 常駐ルームと衝突しないコードを確保する
    fn allocate_code(&self) -> RoomCode {
        loop {
            let code = RoomCodeFactory::generate();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    /// 接続がホストであるルームへの可変参照を引く
    ///
    /// 接続がどのルームにも属していない場合も、属しているがホストでは
    /// ない場合も `NotAuthorized`。状態は一切変更しない。
    fn host_room_mut(&mut self, connection: &ConnectionId) -> Result<&mut Room, SyncError> {
        let code = self
            .registry
            .room_of(connection)
            .cloned()
            .ok_or(SyncError::NotAuthorized)?;
        let room = self
            .rooms
            .get_mut(&code)
            .ok_or(SyncError::NotAuthorized)?;
        if !room.is_host(connection) {
            return Err(SyncError::NotAuthorized);
        }
        Ok(room)
    }
}

fn playback_view(room: &Room) -> PlaybackView {
    PlaybackView {
        code: room.code.clone(),
        video_ref: room.video_ref.clone(),
        playback_position: room.playback_position,
        is_playing: room.is_playing,
        background_play: room.background_play,
    }
}

/// インメモリ Room Store 実装
pub struct InMemoryRoomStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryRoomStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }
}

impl Default for InMemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn create_room(
        &self,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> RoomSnapshot {
        let mut inner = self.inner.lock().await;
        let code = inner.allocate_code();
        let created_at = Timestamp::new(get_unix_timestamp());
        let room = Room::new(
            code.clone(),
            connection.clone(),
            display_name.clone(),
            created_at,
        );
        let snapshot = room.snapshot();
        inner.rooms.insert(code.clone(), room);
        inner
            .registry
            .bind(connection, code.clone(), display_name.into_string());

        tracing::info!("Room '{}' created", code);
        snapshot
    }

    async fn join_room(
        &self,
        code: &RoomCode,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> Result<RoomSnapshot, SyncError> {
        let mut inner = self.inner.lock().await;
        let joined_at = Timestamp::new(get_unix_timestamp());
        let Some(room) = inner.rooms.get_mut(code) else {
            return Err(SyncError::RoomNotFound(code.as_str().to_string()));
        };
        room.add_member(connection.clone(), display_name.clone(), joined_at);
        let snapshot = room.snapshot();
        inner
            .registry
            .bind(connection, code.clone(), display_name.into_string());

        tracing::info!("Member joined room '{}'", code);
        Ok(snapshot)
    }

    async fn remove_member(&self, connection: &ConnectionId) -> Option<DepartureOutcome> {
        let mut inner = self.inner.lock().await;
        let entry = inner.registry.unbind(connection)?;
        let code = entry.room_code;

        let Some(room) = inner.rooms.get_mut(&code) else {
            return None;
        };
        let removed = room.remove_member(connection)?;
        let was_host = removed.is_host;

        if room.is_empty() {
            inner.rooms.remove(&code);
            tracing::info!("Room '{}' destroyed (last member left)", code);
            return Some(DepartureOutcome {
                code,
                display_name: removed.display_name.into_string(),
                was_host,
                promoted: None,
                members: Vec::new(),
                destroyed: true,
            });
        }

        let promoted = if was_host {
            let promoted = room.promote_oldest_member();
            if let Some(new_host) = &promoted {
                tracing::info!("Host left room '{}', promoted '{}'", code, new_host);
            }
            promoted
        } else {
            None
        };
        let members = room.member_views();

        Some(DepartureOutcome {
            code,
            display_name: removed.display_name.into_string(),
            was_host,
            promoted,
            members,
            destroyed: false,
        })
    }

    async fn load_video(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        position: f64,
    ) -> Result<PlaybackView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.load_video(video_ref, position);
        Ok(playback_view(room))
    }

    async fn set_transport(
        &self,
        connection: &ConnectionId,
        position: f64,
        playing: bool,
    ) -> Result<PlaybackView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.set_transport(position, playing);
        Ok(playback_view(room))
    }

    async fn record_heartbeat(
        &self,
        connection: &ConnectionId,
        position: f64,
    ) -> Result<HeartbeatView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.record_heartbeat(position);
        Ok(HeartbeatView {
            code: room.code.clone(),
            is_playing: room.is_playing,
        })
    }

    async fn set_background_play(
        &self,
        connection: &ConnectionId,
        enabled: bool,
    ) -> Result<PlaybackView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.set_background_play(enabled);
        Ok(playback_view(room))
    }

    async fn add_to_queue(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        title: String,
    ) -> Result<QueueView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.enqueue(video_ref, title);
        Ok(QueueView {
            playback: playback_view(room),
            queue: room.queue.clone(),
        })
    }

    async fn remove_from_queue(
        &self,
        connection: &ConnectionId,
        position: usize,
    ) -> Result<QueueView, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        room.remove_queue_item(position);
        Ok(QueueView {
            playback: playback_view(room),
            queue: room.queue.clone(),
        })
    }

    async fn advance_queue(
        &self,
        connection: &ConnectionId,
    ) -> Result<QueueAdvance, SyncError> {
        let mut inner = self.inner.lock().await;
        let room = inner.host_room_mut(connection)?;
        let current = room.advance_queue().ok_or(SyncError::EmptyQueue)?;
        Ok(QueueAdvance {
            playback: playback_view(room),
            current,
            queue: room.queue.clone(),
        })
    }

    async fn member_context(&self, connection: &ConnectionId) -> Option<MemberContext> {
        let inner = self.inner.lock().await;
        let entry = inner.registry.entry_of(connection)?;
        Some(MemberContext {
            code: entry.room_code.clone(),
            display_name: entry.display_name.clone(),
        })
    }

    async fn connections_of(&self, code: &RoomCode) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(code)
            .map(|room| {
                room.members
                    .iter()
                    .map(|m| m.connection_id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn room_summaries(&self) -> Vec<RoomSnapshot> {
        let inner = self.inner.lock().await;
        let mut summaries: Vec<RoomSnapshot> =
            inner.rooms.values().map(|room| room.snapshot()).collect();
        summaries.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        summaries
    }

    async fn room_detail(&self, code: &RoomCode) -> Option<RoomSnapshot> {
        let inner = self.inner.lock().await;
        inner.rooms.get(code).map(|room| room.snapshot())
    }
}
