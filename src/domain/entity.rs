//! ドメイン層のエンティティ
//!
//! `Room` はルーム状態同期エンジンの中核であり、すべての不変条件を
//! この型のメソッドで守ります：
//!
//! - メンバーが 1 人以上いる間、ホストはちょうど 1 人
//! - キューの `position` はどの変更後も `0..len-1` の密な連番
//! - 再生位置は負にならず、動画ロード時（明示・キュー前進とも）に 0 へ戻る
//!
//! ここでの操作はすべて純粋なインメモリ変更であり、排他制御や通知は
//! 上位層（Room Store・ハンドラ）の責務です。

use super::value_object::{ConnectionId, DisplayName, RoomCode, Timestamp};

/// ルームのメンバー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub display_name: DisplayName,
    /// 常に `connection_id == room.host_connection` と一致する
    pub is_host: bool,
    pub joined_at: Timestamp,
}

/// キュー項目
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub video_ref: String,
    pub title: String,
    /// 0 始まりの密な再生順
    pub position: usize,
}

/// メンバーの読み取り用ビュー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub is_host: bool,
    pub joined_at: Timestamp,
}

/// ルーム状態のスナップショット
///
/// join 時のキャッチアップと HTTP 診断エンドポイントに使用する。
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub video_ref: String,
    pub playback_position: f64,
    pub is_playing: bool,
    pub background_play: bool,
    pub queue: Vec<QueueItem>,
    pub members: Vec<MemberView>,
    pub created_at: Timestamp,
}

/// 同期セッションとしてのルーム
///
/// メンバーリストは参加順を保持する。ホスト切断時の昇格はこの順序の
/// 先頭（最古参）を選ぶため、決定的で常に在室メンバーを指す。
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub host_connection: ConnectionId,
    /// 不透明な動画参照。未ロードの間は空文字列。
    pub video_ref: String,
    pub playback_position: f64,
    pub is_playing: bool,
    pub background_play: bool,
    pub queue: Vec<QueueItem>,
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Room {
    /// 作成者をホストとして新しいルームを作る
    pub fn new(
        code: RoomCode,
        host_connection: ConnectionId,
        host_name: DisplayName,
        created_at: Timestamp,
    ) -> Self {
        let host = Member {
            connection_id: host_connection.clone(),
            display_name: host_name,
            is_host: true,
            joined_at: created_at,
        };
        Self {
            code,
            host_connection,
            video_ref: String::new(),
            playback_position: 0.0,
            is_playing: false,
            background_play: false,
            queue: Vec::new(),
            members: vec![host],
            created_at,
        }
    }

    /// ホスト判定（純粋な述語）
    pub fn is_host(&self, connection: &ConnectionId) -> bool {
        &self.host_connection == connection
    }

    /// 非ホストのメンバーを追加する
    pub fn add_member(
        &mut self,
        connection: ConnectionId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) {
        self.members.push(Member {
            connection_id: connection,
            display_name,
            is_host: false,
            joined_at,
        });
    }

    /// メンバーを取り除き、取り除いた Member を返す
    pub fn remove_member(&mut self, connection: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|m| &m.connection_id == connection)?;
        Some(self.members.remove(index))
    }

    /// 残存メンバーの先頭を新ホストへ昇格する
    ///
    /// 旧ホストが取り除かれた後にのみ呼ぶこと。昇格した接続 ID を返す。
    pub fn promote_oldest_member(&mut self) -> Option<ConnectionId> {
        let next = self.members.first_mut()?;
        next.is_host = true;
        self.host_connection = next.connection_id.clone();
        Some(next.connection_id.clone())
    }

    pub fn member(&self, connection: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 動画を明示的にロードする。再生位置は与えられた値（負なら 0）、
    /// 再生状態は一時停止になる。
    pub fn load_video(&mut self, video_ref: String, position: f64) {
        self.video_ref = video_ref;
        self.playback_position = position.max(0.0);
        self.is_playing = false;
    }

    /// 再生位置と再生状態を更新する（play / pause）
    pub fn set_transport(&mut self, position: f64, playing: bool) {
        self.playback_position = position.max(0.0);
        self.is_playing = playing;
    }

    /// ハートビートによる位置スナップショット。再生状態は変えない。
    pub fn record_heartbeat(&mut self, position: f64) {
        self.playback_position = position.max(0.0);
    }

    pub fn set_background_play(&mut self, enabled: bool) {
        self.background_play = enabled;
    }

    /// キュー末尾に項目を追加する
    pub fn enqueue(&mut self, video_ref: String, title: String) {
        let position = self.queue.len();
        self.queue.push(QueueItem {
            video_ref,
            title,
            position,
        });
    }

    /// 指定 position の項目を取り除き、残りを詰め直す
    ///
    /// 該当項目がなくてもエラーにはしない（結果のキューを配信するだけ）。
    pub fn remove_queue_item(&mut self, position: usize) {
        self.queue.retain(|item| item.position != position);
        self.renumber_queue();
    }

    /// キュー先頭を取り出して現在の動画にする
    ///
    /// 取り出した項目を返す。再生位置は 0 に戻り、再生中になる。
    /// キューが空なら何も変えずに None を返す。
    pub fn advance_queue(&mut self) -> Option<QueueItem> {
        if self.queue.is_empty() {
            return None;
        }
        let next = self.queue.remove(0);
        self.renumber_queue();
        self.video_ref = next.video_ref.clone();
        self.playback_position = 0.0;
        self.is_playing = true;
        Some(next)
    }

    fn renumber_queue(&mut self) {
        for (index, item) in self.queue.iter_mut().enumerate() {
            item.position = index;
        }
    }

    pub fn member_views(&self) -> Vec<MemberView> {
        self.members
            .iter()
            .map(|m| MemberView {
                connection_id: m.connection_id.clone(),
                display_name: m.display_name.as_str().to_string(),
                is_host: m.is_host,
                joined_at: m.joined_at,
            })
            .collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            video_ref: self.video_ref.clone(),
            playback_position: self.playback_position,
            is_playing: self.is_playing,
            background_play: self.background_play,
            queue: self.queue.clone(),
            members: self.member_views(),
            created_at: self.created_at,
        }
    }
}
