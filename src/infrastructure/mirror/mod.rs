//! Room Mirror 実装

pub mod sqlite;

pub use sqlite::SqliteRoomMirror;
