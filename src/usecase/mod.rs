//! UseCase 層
//!
//! クライアント発のイベントファミリーごとに 1 つのユースケースを置き、
//! Room Store・Room Mirror を組み合わせて状態遷移を実行します。
//! クライアントへの通知（DTO の構築とブロードキャスト）は UI 層の
//! 責務です。

pub mod chat;
pub mod create_room;
pub mod directory;
pub mod disconnect;
pub mod game_relay;
pub mod join_room;
pub mod playback;
pub mod queue;

pub use chat::{ChatRelay, SendMessageUseCase};
pub use create_room::CreateRoomUseCase;
pub use directory::RoomDirectoryUseCase;
pub use disconnect::DisconnectParticipantUseCase;
pub use game_relay::RelayGameEventUseCase;
pub use join_room::JoinRoomUseCase;
pub use playback::ControlPlaybackUseCase;
pub use queue::ManageQueueUseCase;
