//! Watch-together video synchronization server.
//!
//! One member of a room holds host authority over the shared playback clock
//! and queue; every other member is kept in lock-step via relayed events.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tomoni-server
//! cargo run --bin tomoni-server -- --host 0.0.0.0 --port 9000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use tokio::sync::Mutex;
use tomoni::{
    common::logger::setup_logger,
    infrastructure::{
        InMemoryRoomStore, RoomBroadcaster, SqliteRoomMirror, WebSocketMessagePusher,
    },
    ui::Server,
    usecase::{
        ControlPlaybackUseCase, CreateRoomUseCase, DisconnectParticipantUseCase, JoinRoomUseCase,
        ManageQueueUseCase, RelayGameEventUseCase, RoomDirectoryUseCase, SendMessageUseCase,
    },
};

#[derive(Parser, Debug)]
#[command(name = "tomoni-server")]
#[command(about = "Watch-together video synchronization server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "9000")]
    port: u16,

    /// SQLite database used as the best-effort persistence mirror
    #[arg(short = 'd', long, default_value = "sqlite://tomoni.db")]
    database_url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Room Store
    // 2. MessagePusher + Broadcaster
    // 3. Room Mirror
    // 4. UseCases
    // 5. Server

    // 1. Create the authoritative in-memory room store
    let store = Arc::new(InMemoryRoomStore::new());

    // 2. Create MessagePusher (WebSocket implementation) and the room-scoped
    //    broadcaster on top of it
    let pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let pusher = Arc::new(WebSocketMessagePusher::new(pusher_clients.clone()));
    let broadcaster = Arc::new(RoomBroadcaster::new(store.clone(), pusher.clone()));

    // 3. Create the persistence mirror (advisory; never consulted while the
    //    process is alive)
    let mirror = match SqliteRoomMirror::connect(&args.database_url).await {
        Ok(mirror) => mirror,
        Err(e) => {
            tracing::error!("Failed to open mirror database '{}': {}", args.database_url, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = mirror.init_schema().await {
        tracing::error!("Failed to initialize mirror schema: {}", e);
        std::process::exit(1);
    }
    let mirror = Arc::new(mirror);
    tracing::info!("Persistence mirror ready at '{}'", args.database_url);

    // 4. Create UseCases
    let create_room_usecase = Arc::new(CreateRoomUseCase::new(store.clone(), mirror.clone()));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(store.clone(), mirror.clone()));
    let playback_usecase = Arc::new(ControlPlaybackUseCase::new(store.clone(), mirror.clone()));
    let queue_usecase = Arc::new(ManageQueueUseCase::new(store.clone(), mirror.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(store.clone()));
    let disconnect_usecase = Arc::new(DisconnectParticipantUseCase::new(
        store.clone(),
        mirror.clone(),
    ));
    let game_relay_usecase = Arc::new(RelayGameEventUseCase::new(store.clone()));
    let directory_usecase = Arc::new(RoomDirectoryUseCase::new(store.clone()));

    // 5. Create and run the server
    let server = Server::new(
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
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
