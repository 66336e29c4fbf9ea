//! Integration tests for the watch-together synchronization server.
//!
//! Each test boots a real server on a dedicated local port and drives it
//! with WebSocket clients, asserting on the actual event frames members
//! receive.

use std::{collections::HashMap, str::FromStr, sync::Arc, time::Duration};

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use tomoni::{
    infrastructure::{
        InMemoryRoomStore, RoomBroadcaster, SqliteRoomMirror, WebSocketMessagePusher,
    },
    ui::Server,
    usecase::{
        ControlPlaybackUseCase, CreateRoomUseCase, DisconnectParticipantUseCase, JoinRoomUseCase,
        ManageQueueUseCase, RelayGameEventUseCase, RoomDirectoryUseCase, SendMessageUseCase,
    },
};

type WsWrite = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsRead = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Boot a server on the given port with an in-memory mirror.
async fn start_server(port: u16) {
    let store = Arc::new(InMemoryRoomStore::new());
    let pusher_clients = Arc::new(Mutex::new(HashMap::new()));
    let pusher = Arc::new(WebSocketMessagePusher::new(pusher_clients));
    let broadcaster = Arc::new(RoomBroadcaster::new(store.clone(), pusher.clone()));

    let options = SqliteConnectOptions::from_str("sqlite::memory:").expect("sqlite options");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("sqlite pool");
    let mirror = SqliteRoomMirror::new(pool);
    mirror.init_schema().await.expect("mirror schema");
    let mirror = Arc::new(mirror);

    let server = Server::new(
        Arc::new(CreateRoomUseCase::new(store.clone(), mirror.clone())),
        Arc::new(JoinRoomUseCase::new(store.clone(), mirror.clone())),
        Arc::new(ControlPlaybackUseCase::new(store.clone(), mirror.clone())),
        Arc::new(ManageQueueUseCase::new(store.clone(), mirror.clone())),
        Arc::new(SendMessageUseCase::new(store.clone())),
        Arc::new(DisconnectParticipantUseCase::new(
            store.clone(),
            mirror.clone(),
        )),
        Arc::new(RelayGameEventUseCase::new(store.clone())),
        Arc::new(RoomDirectoryUseCase::new(store.clone())),
        broadcaster,
        pusher,
    );

    tokio::spawn(async move {
        server
            .run("127.0.0.1".to_string(), port)
            .await
            .expect("server run");
    });

    // Give the server time to bind
    tokio::time::sleep(Duration::from_millis(300)).await;
}

async fn connect_client(port: u16) -> (WsWrite, WsRead) {
    let (ws, _) = connect_async(format!("ws://127.0.0.1:{port}/ws"))
        .await
        .expect("client connect");
    ws.split()
}

async fn send_event(write: &mut WsWrite, event: Value) {
    write
        .send(Message::Text(event.to_string().into()))
        .await
        .expect("send event");
}

/// Receive the next JSON event frame, failing the test after a timeout.
async fn recv_event(read: &mut WsRead) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(3), read.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(&text).expect("valid JSON frame"),
            // Ignore transport-level frames
            _ => continue,
        }
    }
}

/// Assert that no event frame arrives within a short window.
async fn assert_silent(read: &mut WsRead) {
    let result = tokio::time::timeout(Duration::from_millis(300), read.next()).await;
    assert!(result.is_err(), "expected silence, got {result:?}");
}

/// Create a room and drain the creator's room-created / user-list /
/// queue-update frames. Returns the room code.
async fn create_room(write: &mut WsWrite, read: &mut WsRead, username: &str) -> String {
    send_event(write, json!({"event": "create-room", "data": {"username": username}})).await;
    let created = recv_event(read).await;
    assert_eq!(created["event"], "room-created");
    let code = created["data"]["roomId"].as_str().expect("room code").to_string();
    let user_list = recv_event(read).await;
    assert_eq!(user_list["event"], "user-list");
    let queue = recv_event(read).await;
    assert_eq!(queue["event"], "queue-update");
    code
}

/// Join a room and drain the joiner's room-joined / user-list /
/// queue-update / system new-message frames.
async fn join_room(write: &mut WsWrite, read: &mut WsRead, code: &str, username: &str) {
    send_event(
        write,
        json!({"event": "join-room", "data": {"roomId": code, "username": username}}),
    )
    .await;
    let joined = recv_event(read).await;
    assert_eq!(joined["event"], "room-joined");
    for _ in 0..3 {
        recv_event(read).await;
    }
}

/// Drain the three frames an existing member receives when someone joins
/// (user-list, queue-update, system new-message).
async fn drain_join_frames(read: &mut WsRead) {
    for _ in 0..3 {
        recv_event(read).await;
    }
}

#[tokio::test]
async fn test_create_room_returns_code_host_flag_and_empty_queue() {
    let port = 19080;
    start_server(port).await;
    let (mut write, mut read) = connect_client(port).await;

    send_event(
        &mut write,
        json!({"event": "create-room", "data": {"username": "alice"}}),
    )
    .await;

    let created = recv_event(&mut read).await;
    assert_eq!(created["event"], "room-created");
    assert_eq!(created["data"]["success"], true);
    assert_eq!(created["data"]["isHost"], true);
    let code = created["data"]["roomId"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));

    let user_list = recv_event(&mut read).await;
    assert_eq!(user_list["event"], "user-list");
    assert_eq!(user_list["data"].as_array().unwrap().len(), 1);
    assert_eq!(user_list["data"][0]["username"], "alice");
    assert_eq!(user_list["data"][0]["isHost"], true);

    let queue = recv_event(&mut read).await;
    assert_eq!(queue["event"], "queue-update");
    assert_eq!(queue["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_join_room_delivers_catchup_state_and_notifies_room() {
    let port = 19081;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    // Host loads a video so the joiner has state to catch up on
    send_event(
        &mut host_write,
        json!({"event": "load-video", "data": {"videoId": "v1", "currentTime": 42.0}}),
    )
    .await;
    let loaded = recv_event(&mut host_read).await;
    assert_eq!(loaded["event"], "video-loaded");

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    send_event(
        &mut follower_write,
        json!({"event": "join-room", "data": {"roomId": code, "username": "bob"}}),
    )
    .await;

    let joined = recv_event(&mut follower_read).await;
    assert_eq!(joined["event"], "room-joined");
    assert_eq!(joined["data"]["success"], true);
    assert_eq!(joined["data"]["isHost"], false);
    assert_eq!(joined["data"]["roomId"], code);
    assert_eq!(joined["data"]["state"]["videoId"], "v1");
    assert_eq!(joined["data"]["state"]["currentTime"], 42.0);
    assert_eq!(joined["data"]["state"]["isPlaying"], false);
    assert!(joined["data"]["state"]["timestamp"].as_i64().unwrap() > 0);

    let user_list = recv_event(&mut follower_read).await;
    assert_eq!(user_list["event"], "user-list");
    assert_eq!(user_list["data"].as_array().unwrap().len(), 2);

    let queue = recv_event(&mut follower_read).await;
    assert_eq!(queue["event"], "queue-update");

    let system = recv_event(&mut follower_read).await;
    assert_eq!(system["event"], "new-message");
    assert_eq!(system["data"]["username"], "System");
    assert_eq!(system["data"]["message"], "bob joined the room");
    assert_eq!(system["data"]["isSystem"], true);

    // The host sees the same room-wide frames
    let host_user_list = recv_event(&mut host_read).await;
    assert_eq!(host_user_list["event"], "user-list");
    let host_queue = recv_event(&mut host_read).await;
    assert_eq!(host_queue["event"], "queue-update");
    let host_system = recv_event(&mut host_read).await;
    assert_eq!(host_system["data"]["message"], "bob joined the room");
}

#[tokio::test]
async fn test_join_unknown_code_answers_requester_only() {
    let port = 19082;
    start_server(port).await;
    let (mut write, mut read) = connect_client(port).await;

    send_event(
        &mut write,
        json!({"event": "join-room", "data": {"roomId": "ZZ99ZZ", "username": "bob"}}),
    )
    .await;

    let error = recv_event(&mut read).await;
    assert_eq!(error["event"], "join-error");
    assert_eq!(error["data"]["error"], "Room not found");
    assert_silent(&mut read).await;
}

#[tokio::test]
async fn test_queue_scenario_add_remove_play_next() {
    let port = 19083;
    start_server(port).await;
    let (mut write, mut read) = connect_client(port).await;
    create_room(&mut write, &mut read, "alice").await;

    send_event(
        &mut write,
        json!({"event": "load-video", "data": {"videoId": "v1"}}),
    )
    .await;
    let loaded = recv_event(&mut read).await;
    assert_eq!(loaded["event"], "video-loaded");
    assert_eq!(loaded["data"]["videoId"], "v1");
    assert_eq!(loaded["data"]["currentTime"], 0.0);
    assert_eq!(loaded["data"]["isPlaying"], false);

    // add v2, v3
    send_event(
        &mut write,
        json!({"event": "add-to-queue", "data": {"videoId": "v2", "title": "Title2"}}),
    )
    .await;
    let first = recv_event(&mut read).await;
    assert_eq!(first["event"], "queue-update");
    assert_eq!(first["data"][0]["videoId"], "v2");
    assert_eq!(first["data"][0]["position"], 0);

    send_event(
        &mut write,
        json!({"event": "add-to-queue", "data": {"videoId": "v3", "title": "Title3"}}),
    )
    .await;
    let second = recv_event(&mut read).await;
    assert_eq!(second["data"].as_array().unwrap().len(), 2);
    assert_eq!(second["data"][1]["videoId"], "v3");
    assert_eq!(second["data"][1]["position"], 1);

    // remove position 0 -> only v3 remains, renumbered to 0
    send_event(
        &mut write,
        json!({"event": "remove-from-queue", "data": {"position": 0}}),
    )
    .await;
    let after_remove = recv_event(&mut read).await;
    assert_eq!(after_remove["data"].as_array().unwrap().len(), 1);
    assert_eq!(after_remove["data"][0]["videoId"], "v3");
    assert_eq!(after_remove["data"][0]["position"], 0);

    // play-next -> v3 becomes current, playing from 0, queue empties
    send_event(&mut write, json!({"event": "play-next"})).await;
    let next_loaded = recv_event(&mut read).await;
    assert_eq!(next_loaded["event"], "video-loaded");
    assert_eq!(next_loaded["data"]["videoId"], "v3");
    assert_eq!(next_loaded["data"]["currentTime"], 0.0);
    assert_eq!(next_loaded["data"]["isPlaying"], true);
    let empty_queue = recv_event(&mut read).await;
    assert_eq!(empty_queue["event"], "queue-update");
    assert_eq!(empty_queue["data"].as_array().unwrap().len(), 0);

    // video-ended with an empty queue is a silent no-op
    send_event(&mut write, json!({"event": "video-ended"})).await;
    assert_silent(&mut read).await;
}

#[tokio::test]
async fn test_non_host_privileged_events_are_silently_dropped() {
    let port = 19084;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    join_room(&mut follower_write, &mut follower_read, &code, "bob").await;
    drain_join_frames(&mut host_read).await;

    // Follower attempts host-only mutations
    send_event(
        &mut follower_write,
        json!({"event": "load-video", "data": {"videoId": "v9"}}),
    )
    .await;
    send_event(
        &mut follower_write,
        json!({"event": "add-to-queue", "data": {"videoId": "v9", "title": "Nope"}}),
    )
    .await;
    send_event(
        &mut follower_write,
        json!({"event": "play", "data": {"currentTime": 10.0}}),
    )
    .await;

    // Nobody receives anything: no state change, no broadcast, no error
    assert_silent(&mut host_read).await;
    assert_silent(&mut follower_read).await;
}

#[tokio::test]
async fn test_heartbeat_reaches_followers_but_not_host() {
    let port = 19085;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    join_room(&mut follower_write, &mut follower_read, &code, "bob").await;
    drain_join_frames(&mut host_read).await;

    // Host starts playback, then heartbeats
    send_event(
        &mut host_write,
        json!({"event": "play", "data": {"currentTime": 40.0}}),
    )
    .await;
    let play = recv_event(&mut host_read).await;
    assert_eq!(play["event"], "play");
    let follower_play = recv_event(&mut follower_read).await;
    assert_eq!(follower_play["event"], "play");
    assert_eq!(follower_play["data"]["currentTime"], 40.0);

    send_event(
        &mut host_write,
        json!({"event": "heartbeat", "data": {"currentTime": 42.5}}),
    )
    .await;

    let sync = recv_event(&mut follower_read).await;
    assert_eq!(sync["event"], "sync-check");
    assert_eq!(sync["data"]["currentTime"], 42.5);
    assert_eq!(sync["data"]["isPlaying"], true);
    assert!(sync["data"]["timestamp"].as_i64().unwrap() > 0);

    // The host does not drift-correct against itself
    assert_silent(&mut host_read).await;
}

#[tokio::test]
async fn test_host_disconnect_promotes_follower() {
    let port = 19086;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    join_room(&mut follower_write, &mut follower_read, &code, "bob").await;
    drain_join_frames(&mut host_read).await;

    // Host disconnects
    host_write.close().await.expect("close host socket");

    let system = recv_event(&mut follower_read).await;
    assert_eq!(system["event"], "new-message");
    assert_eq!(system["data"]["message"], "alice left the room");

    let promoted = recv_event(&mut follower_read).await;
    assert_eq!(promoted["event"], "promoted-to-host");

    let user_list = recv_event(&mut follower_read).await;
    assert_eq!(user_list["event"], "user-list");
    let members = user_list["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["username"], "bob");
    assert_eq!(members[0]["isHost"], true);

    // The promoted follower now holds host authority
    send_event(
        &mut follower_write,
        json!({"event": "load-video", "data": {"videoId": "v1"}}),
    )
    .await;
    let loaded = recv_event(&mut follower_read).await;
    assert_eq!(loaded["event"], "video-loaded");
}

#[tokio::test]
async fn test_last_member_disconnect_frees_room_code() {
    let port = 19087;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    host_write.close().await.expect("close host socket");
    tokio::time::sleep(Duration::from_millis(300)).await;

    // The code no longer resolves
    let (mut write, mut read) = connect_client(port).await;
    send_event(
        &mut write,
        json!({"event": "join-room", "data": {"roomId": code, "username": "late"}}),
    )
    .await;
    let error = recv_event(&mut read).await;
    assert_eq!(error["event"], "join-error");
}

#[tokio::test]
async fn test_chat_relay_and_empty_message_drop() {
    let port = 19088;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    join_room(&mut follower_write, &mut follower_read, &code, "bob").await;
    drain_join_frames(&mut host_read).await;

    // A member message reaches everyone, including the sender
    send_event(
        &mut follower_write,
        json!({"event": "send-message", "data": {"message": "hello room"}}),
    )
    .await;
    let host_msg = recv_event(&mut host_read).await;
    assert_eq!(host_msg["event"], "new-message");
    assert_eq!(host_msg["data"]["username"], "bob");
    assert_eq!(host_msg["data"]["message"], "hello room");
    assert!(host_msg["data"]["senderId"].is_string());
    let follower_msg = recv_event(&mut follower_read).await;
    assert_eq!(follower_msg["data"]["message"], "hello room");

    // A blank message is dropped without feedback
    send_event(
        &mut follower_write,
        json!({"event": "send-message", "data": {"message": "   "}}),
    )
    .await;
    assert_silent(&mut host_read).await;
    assert_silent(&mut follower_read).await;
}

#[tokio::test]
async fn test_game_events_relay_to_other_members_only() {
    let port = 19089;
    start_server(port).await;
    let (mut host_write, mut host_read) = connect_client(port).await;
    let code = create_room(&mut host_write, &mut host_read, "alice").await;

    let (mut follower_write, mut follower_read) = connect_client(port).await;
    join_room(&mut follower_write, &mut follower_read, &code, "bob").await;
    drain_join_frames(&mut host_read).await;

    // Any member may start a game; the payload is relayed opaquely
    send_event(
        &mut follower_write,
        json!({"event": "start-game", "data": {"gameName": "tic-tac-toe"}}),
    )
    .await;
    let started = recv_event(&mut host_read).await;
    assert_eq!(started["event"], "game-started");
    assert_eq!(started["data"]["gameName"], "tic-tac-toe");
    assert_eq!(started["data"]["startedBy"], "bob");
    assert_silent(&mut follower_read).await;

    // Moves carry an opaque payload and the sender's identity
    send_event(
        &mut follower_write,
        json!({
            "event": "game-move",
            "data": {"gameName": "tic-tac-toe", "moveData": {"cell": 4}}
        }),
    )
    .await;
    let game_move = recv_event(&mut host_read).await;
    assert_eq!(game_move["event"], "game-move-update");
    assert_eq!(game_move["data"]["moveData"]["cell"], 4);
    assert_eq!(game_move["data"]["playerName"], "bob");
}
