//! Room Mirror trait 定義
//!
//! ルーム・メンバー・キューの best-effort な永続ミラーを抽象化します。
//! ミラーはプロセス生存中の判断には一切使われず、クラッシュ後の診断や
//! 履歴参照のためだけに書き込まれます。
//!
//! 書き込み失敗はインメモリ状態の変更を巻き戻しません。呼び出し側は
//! warn ログを出して続行します。

use async_trait::async_trait;

use super::entity::QueueItem;
use super::error::MirrorError;
use super::store::PlaybackView;
use super::value_object::{ConnectionId, RoomCode, Timestamp};

/// Room Mirror trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomMirror: Send + Sync {
    /// ルーム作成時: ルーム行を挿入する
    async fn room_created(
        &self,
        code: &RoomCode,
        host: &ConnectionId,
        created_at: Timestamp,
    ) -> Result<(), MirrorError>;

    /// メンバー参加時: メンバー行を挿入する
    async fn member_joined(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
        display_name: &str,
        is_host: bool,
        joined_at: Timestamp,
    ) -> Result<(), MirrorError>;

    /// メンバー離脱時: メンバー行を削除する
    async fn member_left(&self, connection: &ConnectionId) -> Result<(), MirrorError>;

    /// ホスト交代時: ルーム行とメンバー行のホスト情報を更新する
    async fn host_changed(
        &self,
        code: &RoomCode,
        new_host: &ConnectionId,
    ) -> Result<(), MirrorError>;

    /// 再生クロック変更時: ルーム行の再生フィールドを更新する
    async fn playback_updated(&self, playback: &PlaybackView) -> Result<(), MirrorError>;

    /// キュー変更時: ルームのキュー行を全て書き直す
    async fn queue_rewritten(
        &self,
        code: &RoomCode,
        queue: &[QueueItem],
    ) -> Result<(), MirrorError>;

    /// ルーム破棄時: ルーム行とキュー行を削除する
    async fn room_destroyed(&self, code: &RoomCode) -> Result<(), MirrorError>;
}
