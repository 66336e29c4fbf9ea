//! ドメイン層
//!
//! ルーム状態同期エンジンのエンティティ・値オブジェクト・エラーと、
//! 外部コラボレータへのインターフェース（Room Store / MessagePusher /
//! Room Mirror）を定義します。

pub mod entity;
pub mod error;
pub mod mirror;
pub mod pusher;
pub mod store;
pub mod value_object;

pub use entity::{Member, MemberView, QueueItem, Room, RoomSnapshot};
pub use error::{MirrorError, PushError, SyncError};
pub use mirror::RoomMirror;
pub use pusher::{MessagePusher, PusherChannel};
pub use store::{
    DepartureOutcome, HeartbeatView, MemberContext, PlaybackView, QueueAdvance, QueueView,
    RoomStore,
};
pub use value_object::{
    ConnectionId, DisplayName, MessageContent, RoomCode, RoomCodeFactory, Timestamp, ValueError,
};

#[cfg(test)]
pub use mirror::MockRoomMirror;
