//! WebSocket message DTOs.
//!
//! Both directions share the same framing: a JSON object with an `event`
//! name in kebab-case and a `data` payload whose keys are camelCase.
//! Timestamps are Unix milliseconds attached at event-construction time and
//! are informational only (clients use them for latency compensation).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-originated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    CreateRoom(CreateRoomData),
    JoinRoom(JoinRoomData),
    LoadVideo(LoadVideoData),
    AddToQueue(AddToQueueData),
    RemoveFromQueue(RemoveFromQueueData),
    PlayNext,
    VideoEnded,
    ToggleBackgroundPlay(ToggleBackgroundPlayData),
    Play(TransportData),
    Pause(TransportData),
    Heartbeat(TransportData),
    SendMessage(SendMessageData),
    StartGame(StartGameData),
    GameMove(GameMoveData),
    GameReset(GameResetData),
    GameStateSync(GameStateSyncData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomData {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomData {
    pub room_id: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadVideoData {
    pub video_id: String,
    #[serde(default)]
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToQueueData {
    pub video_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromQueueData {
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleBackgroundPlayData {
    pub enabled: bool,
}

/// Shared payload for play / pause / heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportData {
    pub current_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageData {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameData {
    pub game_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMoveData {
    pub game_name: String,
    #[serde(default)]
    pub move_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResetData {
    pub game_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSyncData {
    pub game_name: String,
    #[serde(default)]
    pub game_state: Value,
}

/// Server-originated events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        success: bool,
        room_id: String,
        is_host: bool,
    },
    #[serde(rename_all = "camelCase")]
    JoinError { error: String },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        success: bool,
        room_id: String,
        is_host: bool,
        state: PlaybackStateDto,
    },
    UserList(Vec<MemberDto>),
    QueueUpdate(Vec<QueueItemDto>),
    #[serde(rename_all = "camelCase")]
    VideoLoaded {
        video_id: String,
        current_time: f64,
        is_playing: bool,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    BackgroundPlayUpdate { enabled: bool },
    #[serde(rename_all = "camelCase")]
    Play { current_time: f64, timestamp: i64 },
    #[serde(rename_all = "camelCase")]
    Pause { current_time: f64, timestamp: i64 },
    #[serde(rename_all = "camelCase")]
    SyncCheck {
        current_time: f64,
        is_playing: bool,
        timestamp: i64,
    },
    #[serde(rename_all = "camelCase")]
    NewMessage {
        username: String,
        message: String,
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_system: Option<bool>,
    },
    PromotedToHost,
    #[serde(rename_all = "camelCase")]
    GameStarted {
        game_name: String,
        started_by: String,
    },
    #[serde(rename_all = "camelCase")]
    GameMoveUpdate {
        game_name: String,
        move_data: Value,
        player_id: String,
        player_name: String,
    },
    #[serde(rename_all = "camelCase")]
    GameResetUpdate { game_name: String },
    #[serde(rename_all = "camelCase")]
    GameStateUpdate {
        game_name: String,
        game_state: Value,
    },
}

impl ServerEvent {
    /// Build a chat message relayed from a member.
    pub fn user_message(
        username: String,
        message: String,
        sender_id: String,
        timestamp: i64,
    ) -> Self {
        Self::NewMessage {
            username,
            message,
            timestamp,
            sender_id: Some(sender_id),
            is_system: None,
        }
    }

    /// Build a system chat message ("X joined the room" etc.).
    pub fn system_message(message: String, timestamp: i64) -> Self {
        Self::NewMessage {
            username: "System".to_string(),
            message,
            timestamp,
            sender_id: None,
            is_system: Some(true),
        }
    }
}

/// Playback clock state sent to a joining member for catch-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStateDto {
    pub video_id: String,
    pub current_time: f64,
    pub is_playing: bool,
    pub background_play: bool,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub username: String,
    pub is_host: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItemDto {
    pub video_id: String,
    pub title: String,
    pub position: usize,
}
