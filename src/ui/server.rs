//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::domain::MessagePusher;
use crate::infrastructure::RoomBroadcaster;
use crate::usecase::{
    ControlPlaybackUseCase, CreateRoomUseCase, DisconnectParticipantUseCase, JoinRoomUseCase,
    ManageQueueUseCase, RelayGameEventUseCase, RoomDirectoryUseCase, SendMessageUseCase,
};

use super::{
    handler::{
        http::{get_room_detail, get_rooms, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Watch-together synchronization server
///
/// This struct encapsulates the wired use cases and provides methods to run
/// the server.
pub struct Server {
    /// CreateRoomUseCase（ルーム作成のユースケース）
    create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（ルーム参加のユースケース）
    join_room_usecase: Arc<JoinRoomUseCase>,
    /// ControlPlaybackUseCase（再生クロック操作のユースケース）
    playback_usecase: Arc<ControlPlaybackUseCase>,
    /// ManageQueueUseCase（キュー操作のユースケース）
    queue_usecase: Arc<ManageQueueUseCase>,
    /// SendMessageUseCase（チャット中継のユースケース）
    send_message_usecase: Arc<SendMessageUseCase>,
    /// DisconnectParticipantUseCase（切断処理のユースケース）
    disconnect_usecase: Arc<DisconnectParticipantUseCase>,
    /// RelayGameEventUseCase（ミニゲーム中継のユースケース）
    game_relay_usecase: Arc<RelayGameEventUseCase>,
    /// RoomDirectoryUseCase（診断用読み取りのユースケース）
    directory_usecase: Arc<RoomDirectoryUseCase>,
    /// ルーム単位のブロードキャスト
    broadcaster: Arc<RoomBroadcaster>,
    /// 接続ごとの sender の登録・解除
    pusher: Arc<dyn MessagePusher>,
}

impl Server {
    /// Create a new Server instance
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        create_room_usecase: Arc<CreateRoomUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        playback_usecase: Arc<ControlPlaybackUseCase>,
        queue_usecase: Arc<ManageQueueUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_usecase: Arc<DisconnectParticipantUseCase>,
        game_relay_usecase: Arc<RelayGameEventUseCase>,
        directory_usecase: Arc<RoomDirectoryUseCase>,
        broadcaster: Arc<RoomBroadcaster>,
        pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            create_room_usecase,
            join_room_usecase,
            playback_usecase,
            queue_usecase,
            send_message_usecase,
            disconnect_usecase,
            game_relay_usecase,
            directory_usecase,
            broadcaster,
            pusher,
        }
    }

    /// Run the synchronization server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> std::io::Result<()> {
        let app_state = Arc::new(AppState {
            create_room_usecase: self.create_room_usecase,
            join_room_usecase: self.join_room_usecase,
            playback_usecase: self.playback_usecase,
            queue_usecase: self.queue_usecase,
            send_message_usecase: self.send_message_usecase,
            disconnect_usecase: self.disconnect_usecase,
            game_relay_usecase: self.game_relay_usecase,
            directory_usecase: self.directory_usecase,
            broadcaster: self.broadcaster,
            pusher: self.pusher,
        });

        // Define handlers
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{code}", get(get_room_detail))
            .with_state(app_state)
            // クライアントページ（静的ファイル）
            .fallback_service(ServeDir::new("static"))
            .layer(TraceLayer::new_for_http());

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Synchronization server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
