//! Room Store trait 定義
//!
//! ルームテーブルへの直列化された変更入口をドメイン層のインターフェース
//! として定義します。具体的な実装は Infrastructure 層が提供します
//! （依存性の逆転）。
//!
//! ## 排他と認可
//!
//! 各メソッドは 1 回の呼び出しが 1 つのクリティカルセクションとして
//! 完結することを要求します。特権メソッド（ホストのみが呼べるもの）は
//! 同じクリティカルセクション内でホスト判定を行い、非ホストからの
//! 呼び出しには一切の状態変更なしに `SyncError::NotAuthorized` を
//! 返します。呼び出し側はこれを黙って破棄します。

use async_trait::async_trait;

use super::entity::{MemberView, QueueItem, RoomSnapshot};
use super::error::SyncError;
use super::value_object::{ConnectionId, DisplayName, RoomCode};

/// 再生クロックの読み取りビュー
///
/// 特権変更の結果としてハンドラとミラーへ渡される。
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackView {
    pub code: RoomCode,
    pub video_ref: String,
    pub playback_position: f64,
    pub is_playing: bool,
    pub background_play: bool,
}

/// キュー変更の結果
#[derive(Debug, Clone, PartialEq)]
pub struct QueueView {
    pub playback: PlaybackView,
    pub queue: Vec<QueueItem>,
}

/// キュー前進の結果
#[derive(Debug, Clone, PartialEq)]
pub struct QueueAdvance {
    pub playback: PlaybackView,
    /// 新しく現在の動画になった項目
    pub current: QueueItem,
    pub queue: Vec<QueueItem>,
}

/// ハートビートの結果
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatView {
    pub code: RoomCode,
    pub is_playing: bool,
}

/// 接続が属するルームと表示名
#[derive(Debug, Clone, PartialEq)]
pub struct MemberContext {
    pub code: RoomCode,
    pub display_name: String,
}

/// メンバー離脱の結果
///
/// ホスト切断時のフェイルオーバーとルーム破棄は `remove_member` の
/// クリティカルセクション内で完結しており、この構造体は通知に必要な
/// 事後情報だけを運ぶ。
#[derive(Debug, Clone, PartialEq)]
pub struct DepartureOutcome {
    pub code: RoomCode,
    pub display_name: String,
    pub was_host: bool,
    /// フェイルオーバーで昇格した接続（あれば）
    pub promoted: Option<ConnectionId>,
    /// 離脱処理後の残存メンバー
    pub members: Vec<MemberView>,
    /// 最後のメンバーが離脱しルームが破棄されたか
    pub destroyed: bool,
}

/// Room Store trait
///
/// ルームテーブルと接続→ルームのインデックスを所有し、すべての
/// ルーム変更を直列化する。UseCase 層はこの trait にのみ依存する。
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// 新しいルームを作成し、作成者をホストとして登録する
    ///
    /// コードは常駐ルームと衝突しなくなるまで再生成される。
    async fn create_room(
        &self,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> RoomSnapshot;

    /// 既存ルームへ非ホストとして参加する
    ///
    /// コードが常駐していなければ `RoomNotFound`。成功時はキャッチアップ
    /// 用のスナップショットを返す。
    async fn join_room(
        &self,
        code: &RoomCode,
        connection: ConnectionId,
        display_name: DisplayName,
    ) -> Result<RoomSnapshot, SyncError>;

    /// 接続をその所属ルームから取り除く
    ///
    /// ホストだった場合は残存メンバーの先頭を昇格し、最後の 1 人だった
    /// 場合はルームを破棄する。どのルームにも属していなければ None。
    async fn remove_member(&self, connection: &ConnectionId) -> Option<DepartureOutcome>;

    /// 動画をロードする（ホストのみ）
    async fn load_video(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        position: f64,
    ) -> Result<PlaybackView, SyncError>;

    /// 再生位置と再生状態を設定する（play / pause、ホストのみ）
    async fn set_transport(
        &self,
        connection: &ConnectionId,
        position: f64,
        playing: bool,
    ) -> Result<PlaybackView, SyncError>;

    /// ハートビートの位置スナップショット（ホストのみ、再生状態は不変）
    async fn record_heartbeat(
        &self,
        connection: &ConnectionId,
        position: f64,
    ) -> Result<HeartbeatView, SyncError>;

    /// バックグラウンド再生の切り替え（ホストのみ）
    async fn set_background_play(
        &self,
        connection: &ConnectionId,
        enabled: bool,
    ) -> Result<PlaybackView, SyncError>;

    /// キュー末尾へ追加する（ホストのみ）
    async fn add_to_queue(
        &self,
        connection: &ConnectionId,
        video_ref: String,
        title: String,
    ) -> Result<QueueView, SyncError>;

    /// 指定 position の項目を取り除く（ホストのみ）
    async fn remove_from_queue(
        &self,
        connection: &ConnectionId,
        position: usize,
    ) -> Result<QueueView, SyncError>;

    /// キュー先頭を現在の動画にする（ホストのみ、空なら `EmptyQueue`）
    async fn advance_queue(&self, connection: &ConnectionId)
    -> Result<QueueAdvance, SyncError>;

    /// 接続が属するルームと表示名を引く（チャット・ゲーム中継用）
    async fn member_context(&self, connection: &ConnectionId) -> Option<MemberContext>;

    /// ルームの現在の接続一覧（ブロードキャスト対象の解決用）
    async fn connections_of(&self, code: &RoomCode) -> Vec<ConnectionId>;

    /// 常駐ルームのスナップショット一覧（診断用）
    async fn room_summaries(&self) -> Vec<RoomSnapshot>;

    /// 指定コードのルームのスナップショット（診断用）
    async fn room_detail(&self, code: &RoomCode) -> Option<RoomSnapshot>;
}
