//! SQLite を使った Room Mirror 実装
//!
//! ルーム・メンバー・キューのスナップショットを SQLite に写す。
//! ミラーは best-effort であり、書き込み失敗はインメモリ状態に影響
//! しない。プロセス生存中にここから読み戻すこともない（参照するのは
//! プロセス外の診断ツールだけ）。

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::domain::{
    ConnectionId, MirrorError, PlaybackView, QueueItem, RoomCode, RoomMirror, Timestamp,
};

fn db_err(e: sqlx::Error) -> MirrorError {
    MirrorError::WriteFailed(e.to_string())
}

/// SQLite を使った Room Mirror 実装
pub struct SqliteRoomMirror {
    pool: SqlitePool,
}

impl SqliteRoomMirror {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 接続 URL からミラーを作る（ファイルがなければ作成する）
    pub async fn connect(url: &str) -> Result<Self, MirrorError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// スキーマを初期化する
    pub async fn init_schema(&self) -> Result<(), MirrorError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rooms (
                code TEXT PRIMARY KEY,
                host_connection_id TEXT,
                video_id TEXT DEFAULT '',
                playback_position REAL DEFAULT 0,
                is_playing INTEGER DEFAULT 0,
                background_play INTEGER DEFAULT 0,
                created_at INTEGER
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS room_users (
                connection_id TEXT PRIMARY KEY,
                room_code TEXT,
                username TEXT,
                is_host INTEGER DEFAULT 0,
                joined_at INTEGER,
                FOREIGN KEY(room_code) REFERENCES rooms(code)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS queue (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                room_code TEXT,
                video_id TEXT,
                video_title TEXT,
                position INTEGER,
                FOREIGN KEY(room_code) REFERENCES rooms(code)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl RoomMirror for SqliteRoomMirror {
    async fn room_created(
        &self,
        code: &RoomCode,
        host: &ConnectionId,
        created_at: Timestamp,
    ) -> Result<(), MirrorError> {
        sqlx::query("INSERT INTO rooms (code, host_connection_id, created_at) VALUES (?, ?, ?)")
            .bind(code.as_str())
            .bind(host.as_str())
            .bind(created_at.value())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn member_joined(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
        display_name: &str,
        is_host: bool,
        joined_at: Timestamp,
    ) -> Result<(), MirrorError> {
        sqlx::query(
            "INSERT INTO room_users (connection_id, room_code, username, is_host, joined_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(connection.as_str())
        .bind(code.as_str())
        .bind(display_name)
        .bind(is_host)
        .bind(joined_at.value())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn member_left(&self, connection: &ConnectionId) -> Result<(), MirrorError> {
        sqlx::query("DELETE FROM room_users WHERE connection_id = ?")
            .bind(connection.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn host_changed(
        &self,
        code: &RoomCode,
        new_host: &ConnectionId,
    ) -> Result<(), MirrorError> {
        sqlx::query("UPDATE rooms SET host_connection_id = ? WHERE code = ?")
            .bind(new_host.as_str())
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        sqlx::query("UPDATE room_users SET is_host = 1 WHERE connection_id = ?")
            .bind(new_host.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn playback_updated(&self, playback: &PlaybackView) -> Result<(), MirrorError> {
        sqlx::query(
            "UPDATE rooms
             SET video_id = ?, playback_position = ?, is_playing = ?, background_play = ?
             WHERE code = ?",
        )
        .bind(&playback.video_ref)
        .bind(playback.playback_position)
        .bind(playback.is_playing)
        .bind(playback.background_play)
        .bind(playback.code.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn queue_rewritten(
        &self,
        code: &RoomCode,
        queue: &[QueueItem],
    ) -> Result<(), MirrorError> {
        sqlx::query("DELETE FROM queue WHERE room_code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        for item in queue {
            sqlx::query(
                "INSERT INTO queue (room_code, video_id, video_title, position)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(code.as_str())
            .bind(&item.video_ref)
            .bind(&item.title)
            .bind(item.position as i64)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        }
        Ok(())
    }

    async fn room_destroyed(&self, code: &RoomCode) -> Result<(), MirrorError> {
        sqlx::query("DELETE FROM rooms WHERE code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM queue WHERE room_code = ?")
            .bind(code.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
