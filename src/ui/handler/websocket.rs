//! WebSocket connection handlers.
//!
//! Each connection gets a server-generated `ConnectionId` and an unbounded
//! channel registered with the `MessagePusher`; events from a single
//! connection are dispatched in the order they arrive on the socket.
//!
//! Error policy: only `join-room` with an unknown code answers the requester
//! (`join-error`). Every other failed event — a non-host privileged mutation,
//! a blank chat message, advancing an empty queue, an event from a connection
//! in no room — is dropped without feedback, which is the externally
//! observable contract of this protocol.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    common::time::get_unix_timestamp,
    domain::{ConnectionId, DisplayName, SyncError},
    infrastructure::dto::{
        conversion::{member_dtos, playback_state_dto, queue_dtos},
        websocket::{ClientEvent, ServerEvent},
    },
};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection = ConnectionId::generate();
    tracing::info!("Connection '{}' accepted", connection);
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection: ConnectionId) {
    let (sender, mut receiver) = socket.split();

    // Register this connection's outbound channel
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register_client(connection.clone(), tx).await;

    // Spawn a task to push messages from other handlers to this client
    let mut send_task = pusher_loop(rx, sender);

    let connection_clone = connection.clone();
    let state_clone = state.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => dispatch_event(&state_clone, &connection_clone, event).await,
                    Err(e) => {
                        tracing::warn!(
                            "Ignoring unparseable event from '{}': {}",
                            connection_clone,
                            e
                        );
                    }
                },
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // The transport-level disconnect is the authoritative "member gone"
    // signal: unregister the channel, then run departure handling.
    state.pusher.unregister_client(&connection).await;
    handle_departure(&state, &connection).await;
}

fn display_name_or_anonymous(username: Option<String>) -> DisplayName {
    username
        .and_then(|name| DisplayName::new(name).ok())
        .unwrap_or_else(DisplayName::anonymous)
}

/// Log-and-drop for events the protocol answers with silence.
fn drop_event(connection: &ConnectionId, event_name: &str, error: &SyncError) {
    tracing::debug!("Dropping {} from '{}': {}", event_name, connection, error);
}

async fn dispatch_event(state: &Arc<AppState>, connection: &ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::CreateRoom(data) => {
            let display_name = display_name_or_anonymous(data.username);
            let snapshot = state
                .create_room_usecase
                .execute(connection.clone(), display_name)
                .await;

            state
                .broadcaster
                .send_to(
                    connection,
                    &ServerEvent::RoomCreated {
                        success: true,
                        room_id: snapshot.code.as_str().to_string(),
                        is_host: true,
                    },
                )
                .await;
            state
                .broadcaster
                .broadcast(
                    &snapshot.code,
                    &ServerEvent::UserList(member_dtos(&snapshot.members)),
                    None,
                )
                .await;
            state
                .broadcaster
                .broadcast(
                    &snapshot.code,
                    &ServerEvent::QueueUpdate(queue_dtos(&snapshot.queue)),
                    None,
                )
                .await;
        }

        ClientEvent::JoinRoom(data) => {
            let display_name = display_name_or_anonymous(data.username);
            let username = display_name.as_str().to_string();
            match state
                .join_room_usecase
                .execute(&data.room_id, connection.clone(), display_name)
                .await
            {
                Ok(snapshot) => {
                    let timestamp = get_unix_timestamp();
                    state
                        .broadcaster
                        .send_to(
                            connection,
                            &ServerEvent::RoomJoined {
                                success: true,
                                room_id: snapshot.code.as_str().to_string(),
                                is_host: false,
                                state: playback_state_dto(&snapshot, timestamp),
                            },
                        )
                        .await;
                    state
                        .broadcaster
                        .broadcast(
                            &snapshot.code,
                            &ServerEvent::UserList(member_dtos(&snapshot.members)),
                            None,
                        )
                        .await;
                    state
                        .broadcaster
                        .broadcast(
                            &snapshot.code,
                            &ServerEvent::QueueUpdate(queue_dtos(&snapshot.queue)),
                            None,
                        )
                        .await;
                    state
                        .broadcaster
                        .broadcast(
                            &snapshot.code,
                            &ServerEvent::system_message(
                                format!("{username} joined the room"),
                                timestamp,
                            ),
                            None,
                        )
                        .await;
                }
                Err(SyncError::RoomNotFound(code)) => {
                    tracing::info!(
                        "Connection '{}' tried to join unknown room '{}'",
                        connection,
                        code
                    );
                    state
                        .broadcaster
                        .send_to(
                            connection,
                            &ServerEvent::JoinError {
                                error: "Room not found".to_string(),
                            },
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "join-room", &e),
            }
        }

        ClientEvent::LoadVideo(data) => {
            match state
                .playback_usecase
                .load_video(connection, data.video_id, data.current_time)
                .await
            {
                Ok(playback) => {
                    state
                        .broadcaster
                        .broadcast(
                            &playback.code,
                            &ServerEvent::VideoLoaded {
                                video_id: playback.video_ref.clone(),
                                current_time: playback.playback_position,
                                is_playing: playback.is_playing,
                                timestamp: get_unix_timestamp(),
                            },
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "load-video", &e),
            }
        }

        ClientEvent::AddToQueue(data) => {
            match state
                .queue_usecase
                .add(connection, data.video_id, data.title)
                .await
            {
                Ok(view) => {
                    state
                        .broadcaster
                        .broadcast(
                            &view.playback.code,
                            &ServerEvent::QueueUpdate(queue_dtos(&view.queue)),
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "add-to-queue", &e),
            }
        }

        ClientEvent::RemoveFromQueue(data) => {
            match state.queue_usecase.remove(connection, data.position).await {
                Ok(view) => {
                    state
                        .broadcaster
                        .broadcast(
                            &view.playback.code,
                            &ServerEvent::QueueUpdate(queue_dtos(&view.queue)),
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "remove-from-queue", &e),
            }
        }

        ClientEvent::PlayNext => {
            advance_queue(state, connection, "play-next").await;
        }

        ClientEvent::VideoEnded => {
            advance_queue(state, connection, "video-ended").await;
        }

        ClientEvent::ToggleBackgroundPlay(data) => {
            match state
                .playback_usecase
                .set_background_play(connection, data.enabled)
                .await
            {
                Ok(playback) => {
                    state
                        .broadcaster
                        .broadcast(
                            &playback.code,
                            &ServerEvent::BackgroundPlayUpdate {
                                enabled: playback.background_play,
                            },
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "toggle-background-play", &e),
            }
        }

        ClientEvent::Play(data) => {
            match state.playback_usecase.play(connection, data.current_time).await {
                Ok(playback) => {
                    state
                        .broadcaster
                        .broadcast(
                            &playback.code,
                            &ServerEvent::Play {
                                current_time: playback.playback_position,
                                timestamp: get_unix_timestamp(),
                            },
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "play", &e),
            }
        }

        ClientEvent::Pause(data) => {
            match state
                .playback_usecase
                .pause(connection, data.current_time)
                .await
            {
                Ok(playback) => {
                    state
                        .broadcaster
                        .broadcast(
                            &playback.code,
                            &ServerEvent::Pause {
                                current_time: playback.playback_position,
                                timestamp: get_unix_timestamp(),
                            },
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "pause", &e),
            }
        }

        ClientEvent::Heartbeat(data) => {
            match state
                .playback_usecase
                .heartbeat(connection, data.current_time)
                .await
            {
                Ok(view) => {
                    // Followers drift-correct against the host's clock; the
                    // host itself must not receive its own correction.
                    state
                        .broadcaster
                        .broadcast(
                            &view.code,
                            &ServerEvent::SyncCheck {
                                current_time: data.current_time.max(0.0),
                                is_playing: view.is_playing,
                                timestamp: get_unix_timestamp(),
                            },
                            Some(connection),
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "heartbeat", &e),
            }
        }

        ClientEvent::SendMessage(data) => {
            match state
                .send_message_usecase
                .execute(connection, data.message)
                .await
            {
                Ok(relay) => {
                    state
                        .broadcaster
                        .broadcast(
                            &relay.code,
                            &ServerEvent::user_message(
                                relay.username,
                                relay.message,
                                connection.as_str().to_string(),
                                get_unix_timestamp(),
                            ),
                            None,
                        )
                        .await;
                }
                Err(e) => drop_event(connection, "send-message", &e),
            }
        }

        ClientEvent::StartGame(data) => {
            if let Some(sender) = state.game_relay_usecase.resolve_sender(connection).await {
                state
                    .broadcaster
                    .broadcast(
                        &sender.code,
                        &ServerEvent::GameStarted {
                            game_name: data.game_name,
                            started_by: sender.display_name,
                        },
                        Some(connection),
                    )
                    .await;
            }
        }

        ClientEvent::GameMove(data) => {
            if let Some(sender) = state.game_relay_usecase.resolve_sender(connection).await {
                state
                    .broadcaster
                    .broadcast(
                        &sender.code,
                        &ServerEvent::GameMoveUpdate {
                            game_name: data.game_name,
                            move_data: data.move_data,
                            player_id: connection.as_str().to_string(),
                            player_name: sender.display_name,
                        },
                        Some(connection),
                    )
                    .await;
            }
        }

        ClientEvent::GameReset(data) => {
            if let Some(sender) = state.game_relay_usecase.resolve_sender(connection).await {
                state
                    .broadcaster
                    .broadcast(
                        &sender.code,
                        &ServerEvent::GameResetUpdate {
                            game_name: data.game_name,
                        },
                        Some(connection),
                    )
                    .await;
            }
        }

        ClientEvent::GameStateSync(data) => {
            if let Some(sender) = state.game_relay_usecase.resolve_sender(connection).await {
                state
                    .broadcaster
                    .broadcast(
                        &sender.code,
                        &ServerEvent::GameStateUpdate {
                            game_name: data.game_name,
                            game_state: data.game_state,
                        },
                        Some(connection),
                    )
                    .await;
            }
        }
    }
}

async fn advance_queue(state: &Arc<AppState>, connection: &ConnectionId, event_name: &str) {
    match state.queue_usecase.advance(connection).await {
        Ok(advance) => {
            state
                .broadcaster
                .broadcast(
                    &advance.playback.code,
                    &ServerEvent::VideoLoaded {
                        video_id: advance.current.video_ref.clone(),
                        current_time: 0.0,
                        is_playing: true,
                        timestamp: get_unix_timestamp(),
                    },
                    None,
                )
                .await;
            state
                .broadcaster
                .broadcast(
                    &advance.playback.code,
                    &ServerEvent::QueueUpdate(queue_dtos(&advance.queue)),
                    None,
                )
                .await;
        }
        Err(e) => drop_event(connection, event_name, &e),
    }
}

async fn handle_departure(state: &Arc<AppState>, connection: &ConnectionId) {
    let Some(outcome) = state.disconnect_usecase.execute(connection).await else {
        tracing::info!("Connection '{}' closed (was not in a room)", connection);
        return;
    };

    tracing::info!("Connection '{}' left room '{}'", connection, outcome.code);

    // Last member out: the room is gone, nobody is left to notify.
    if outcome.destroyed {
        return;
    }

    let timestamp = get_unix_timestamp();
    state
        .broadcaster
        .broadcast(
            &outcome.code,
            &ServerEvent::system_message(
                format!("{} left the room", outcome.display_name),
                timestamp,
            ),
            None,
        )
        .await;

    if let Some(new_host) = &outcome.promoted {
        state
            .broadcaster
            .send_to(new_host, &ServerEvent::PromotedToHost)
            .await;
    }

    state
        .broadcaster
        .broadcast(
            &outcome.code,
            &ServerEvent::UserList(member_dtos(&outcome.members)),
            None,
        )
        .await;
}
