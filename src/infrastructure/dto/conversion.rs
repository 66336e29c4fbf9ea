//! Conversion logic between DTOs and domain entities.

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::{MemberView, QueueItem, RoomSnapshot};

use super::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto};
use super::websocket::{MemberDto, PlaybackStateDto, QueueItemDto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&QueueItem> for QueueItemDto {
    fn from(item: &QueueItem) -> Self {
        Self {
            video_id: item.video_ref.clone(),
            title: item.title.clone(),
            position: item.position,
        }
    }
}

impl From<&MemberView> for MemberDto {
    fn from(member: &MemberView) -> Self {
        Self {
            username: member.display_name.clone(),
            is_host: member.is_host,
        }
    }
}

/// キュー全体を DTO のリストへ変換
pub fn queue_dtos(queue: &[QueueItem]) -> Vec<QueueItemDto> {
    queue.iter().map(QueueItemDto::from).collect()
}

/// メンバービュー全体を DTO のリストへ変換
pub fn member_dtos(members: &[MemberView]) -> Vec<MemberDto> {
    members.iter().map(MemberDto::from).collect()
}

/// join 時のキャッチアップ用再生状態
pub fn playback_state_dto(snapshot: &RoomSnapshot, timestamp: i64) -> PlaybackStateDto {
    PlaybackStateDto {
        video_id: snapshot.video_ref.clone(),
        current_time: snapshot.playback_position,
        is_playing: snapshot.is_playing,
        background_play: snapshot.background_play,
        timestamp,
    }
}

impl From<&RoomSnapshot> for RoomSummaryDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            code: snapshot.code.as_str().to_string(),
            members: snapshot
                .members
                .iter()
                .map(|m| m.display_name.clone())
                .collect(),
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for RoomDetailDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            code: snapshot.code.as_str().to_string(),
            video_id: snapshot.video_ref.clone(),
            current_time: snapshot.playback_position,
            is_playing: snapshot.is_playing,
            background_play: snapshot.background_play,
            members: snapshot
                .members
                .iter()
                .map(|m| MemberDetailDto {
                    username: m.display_name.clone(),
                    is_host: m.is_host,
                    joined_at: timestamp_to_rfc3339(m.joined_at.value()),
                })
                .collect(),
            queue: queue_dtos(&snapshot.queue),
            created_at: timestamp_to_rfc3339(snapshot.created_at.value()),
        }
    }
}
