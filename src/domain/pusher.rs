//! MessagePusher trait 定義
//!
//! 接続ごとのメッセージ配信を抽象化します。WebSocket の生成は UI 層で
//! 行われ、ここでは生成済みの sender チャンネルに対する登録・送信だけを
//! 扱います。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::PushError;
use super::value_object::ConnectionId;

/// クライアントへメッセージを送るためのチャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// MessagePusher trait
///
/// 配信は at-most-once・best-effort。ブロードキャスト中に消えた接続は
/// 単にスキップされ、エラーにはならない。
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの sender を登録する
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// クライアントの sender を登録解除する
    async fn unregister_client(&self, connection: &ConnectionId);

    /// 特定のクライアントへ送信する
    async fn push_to(&self, connection: &ConnectionId, content: &str) -> Result<(), PushError>;

    /// 複数のクライアントへ送信する（一部の失敗を許容する）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), PushError>;
}
