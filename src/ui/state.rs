//! Shared application state for the HTTP / WebSocket handlers.

use std::sync::Arc;

use crate::domain::MessagePusher;
use crate::infrastructure::RoomBroadcaster;
use crate::usecase::{
    ControlPlaybackUseCase, CreateRoomUseCase, DisconnectParticipantUseCase, JoinRoomUseCase,
    ManageQueueUseCase, RelayGameEventUseCase, RoomDirectoryUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// ControlPlaybackUseCase（再生クロック操作のユースケース）
    pub playback_usecase: Arc<ControlPlaybackUseCase>,
    /// ManageQueueUseCase（キュー操作のユースケース）
    pub queue_usecase: Arc<ManageQueueUseCase>,
    /// SendMessageUseCase（チャット中継のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectParticipantUseCase（切断処理のユースケース）
    pub disconnect_usecase: Arc<DisconnectParticipantUseCase>,
    /// RelayGameEventUseCase（ミニゲーム中継のユースケース）
    pub game_relay_usecase: Arc<RelayGameEventUseCase>,
    /// RoomDirectoryUseCase（診断用読み取りのユースケース）
    pub directory_usecase: Arc<RoomDirectoryUseCase>,
    /// ルーム単位のブロードキャスト
    pub broadcaster: Arc<RoomBroadcaster>,
    /// 接続ごとの sender の登録・解除
    pub pusher: Arc<dyn MessagePusher>,
}
