//! ルーム単位のブロードキャスト
//!
//! Room Store から現在のメンバー接続を解決し、MessagePusher で各接続へ
//! 配信するファンアウトコンポーネント。イベントの直列化は 1 回だけ
//! 行います。
//!
//! 配信は at-most-once・best-effort であり、途中で消えた接続は単に
//! スキップされます。メンバー間の配信順序は保証しません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomCode, RoomStore};

use super::dto::websocket::ServerEvent;

/// ルーム単位のブロードキャスト
pub struct RoomBroadcaster {
    store: Arc<dyn RoomStore>,
    pusher: Arc<dyn MessagePusher>,
}

impl RoomBroadcaster {
    pub fn new(store: Arc<dyn RoomStore>, pusher: Arc<dyn MessagePusher>) -> Self {
        Self { store, pusher }
    }

    /// ルームの全メンバーへイベントを配信する
    ///
    /// `excluding` を与えた場合、その接続だけは配信対象から外す
    /// （ハートビートの sync-check で送信者自身を除くために使う）。
    pub async fn broadcast(
        &self,
        code: &RoomCode,
        event: &ServerEvent,
        excluding: Option<&ConnectionId>,
    ) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize event for room '{}': {}", code, e);
                return;
            }
        };

        let targets: Vec<ConnectionId> = self
            .store
            .connections_of(code)
            .await
            .into_iter()
            .filter(|connection| excluding != Some(connection))
            .collect();

        if targets.is_empty() {
            return;
        }

        if let Err(e) = self.pusher.broadcast(targets, &payload).await {
            tracing::warn!("Broadcast to room '{}' failed: {}", code, e);
        }
    }

    /// 特定の接続へイベントを配信する
    pub async fn send_to(&self, connection: &ConnectionId, event: &ServerEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(
                    "Failed to serialize event for connection '{}': {}",
                    connection,
                    e
                );
                return;
            }
        };

        if let Err(e) = self.pusher.push_to(connection, &payload).await {
            tracing::warn!("Unicast to connection '{}' failed: {}", connection, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, DisplayName};
    use crate::infrastructure::message_pusher::WebSocketMessagePusher;
    use crate::infrastructure::store::InMemoryRoomStore;
    use std::collections::HashMap;
    use tokio::sync::{Mutex, mpsc};

    struct TestSetup {
        broadcaster: RoomBroadcaster,
        store: Arc<InMemoryRoomStore>,
        clients: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<String>>>>,
    }

    fn create_test_setup() -> TestSetup {
        let store = Arc::new(InMemoryRoomStore::new());
        let clients = Arc::new(Mutex::new(HashMap::new()));
        let pusher = Arc::new(WebSocketMessagePusher::new(clients.clone()));
        let broadcaster = RoomBroadcaster::new(store.clone(), pusher);
        TestSetup {
            broadcaster,
            store,
            clients,
        }
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    async fn register(
        setup: &TestSetup,
        connection: &ConnectionId,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut clients = setup.clients.lock().await;
        clients.insert(connection.as_str().to_string(), tx);
        rx
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_room_members() {
        // テスト項目: ブロードキャストがルームの全メンバーに届く
        // given (前提条件):
        let setup = create_test_setup();
        let host = conn("host");
        let follower = conn("follower");
        let mut host_rx = register(&setup, &host).await;
        let mut follower_rx = register(&setup, &follower).await;
        let snapshot = setup.store.create_room(host.clone(), name("alice")).await;
        setup
            .store
            .join_room(&snapshot.code, follower.clone(), name("bob"))
            .await
            .unwrap();

        // when (操作):
        let event = ServerEvent::BackgroundPlayUpdate { enabled: true };
        setup.broadcaster.broadcast(&snapshot.code, &event, None).await;

        // then (期待する結果):
        let host_msg = host_rx.recv().await.unwrap();
        let follower_msg = follower_rx.recv().await.unwrap();
        assert!(host_msg.contains("background-play-update"));
        assert_eq!(host_msg, follower_msg);
    }

    #[tokio::test]
    async fn test_broadcast_excluding_skips_sender() {
        // テスト項目: excluding に指定した接続へは配信されない
        // given (前提条件):
        let setup = create_test_setup();
        let host = conn("host");
        let follower = conn("follower");
        let mut host_rx = register(&setup, &host).await;
        let mut follower_rx = register(&setup, &follower).await;
        let snapshot = setup.store.create_room(host.clone(), name("alice")).await;
        setup
            .store
            .join_room(&snapshot.code, follower.clone(), name("bob"))
            .await
            .unwrap();

        // when (操作):
        let event = ServerEvent::SyncCheck {
            current_time: 42.5,
            is_playing: true,
            timestamp: 1000,
        };
        setup
            .broadcaster
            .broadcast(&snapshot.code, &event, Some(&host))
            .await;

        // then (期待する結果): follower には届き、host には届かない
        let follower_msg = follower_rx.recv().await.unwrap();
        assert!(follower_msg.contains("sync-check"));
        assert!(host_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_room_is_noop() {
        // テスト項目: 存在しないルームへのブロードキャストは何もしない
        // given (前提条件):
        let setup = create_test_setup();
        let code = crate::domain::RoomCode::new("ZZ99ZZ".to_string()).unwrap();

        // when (操作):
        let event = ServerEvent::BackgroundPlayUpdate { enabled: false };
        setup.broadcaster.broadcast(&code, &event, None).await;

        // then (期待する結果): パニックもエラーもなく完了する
    }

    #[tokio::test]
    async fn test_send_to_delivers_unicast() {
        // テスト項目: send_to が特定の接続だけに配信する
        // given (前提条件):
        let setup = create_test_setup();
        let host = conn("host");
        let mut host_rx = register(&setup, &host).await;

        // when (操作):
        setup
            .broadcaster
            .send_to(&host, &ServerEvent::PromotedToHost)
            .await;

        // then (期待する結果):
        let msg = host_rx.recv().await.unwrap();
        assert!(msg.contains("promoted-to-host"));
    }
}
