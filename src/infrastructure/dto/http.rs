//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::QueueItemDto;

/// Summary of a resident room (GET /api/rooms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub code: String,
    pub members: Vec<String>,
    pub created_at: String,
}

/// Member detail (GET /api/rooms/{code})
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailDto {
    pub username: String,
    pub is_host: bool,
    pub joined_at: String,
}

/// Room detail (GET /api/rooms/{code})
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub code: String,
    pub video_id: String,
    pub current_time: f64,
    pub is_playing: bool,
    pub background_play: bool,
    pub members: Vec<MemberDetailDto>,
    pub queue: Vec<QueueItemDto>,
    pub created_at: String,
}
