//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket の `UnboundedSender` を管理
//! - クライアントへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に
//! 使用します。これにより、「WebSocket の生成」と「メッセージの送信」が
//! 分離されます：
//!
//! - UI 層: WebSocket 接続の受付、sender の生成
//! - Infrastructure 層: sender の管理、メッセージ送信

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePusher, PushError, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## フィールド
///
/// - `clients`: 接続中の接続 ID と対応する WebSocket sender のマップ
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: connection_id (String)
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<String, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<String, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection.as_str().to_string(), sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection);
    }

    async fn unregister_client(&self, connection: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection.as_str());
        tracing::debug!("Connection '{}' unregistered from MessagePusher", connection);
    }

    async fn push_to(&self, connection: &ConnectionId, content: &str) -> Result<(), PushError> {
        let clients = self.clients.lock().await;

        if let Some(sender) = clients.get(connection.as_str()) {
            sender
                .send(content.to_string())
                .map_err(|e| PushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed message to connection '{}'", connection);
            Ok(())
        } else {
            Err(PushError::ClientNotFound(connection.as_str().to_string()))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), PushError> {
        let clients = self.clients.lock().await;

        for target in targets {
            if let Some(sender) = clients.get(target.as_str()) {
                // ブロードキャストでは一部の送信失敗を許容
                if let Err(e) = sender.send(content.to_string()) {
                    tracing::warn!(
                        "Failed to push message to connection '{}': {}",
                        target,
                        e
                    );
                } else {
                    tracing::debug!("Broadcasted message to connection '{}'", target);
                }
            } else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
            }
        }

        Ok(())
    }
}
