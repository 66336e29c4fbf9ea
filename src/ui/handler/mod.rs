//! HTTP / WebSocket handlers.

pub mod http;
pub mod websocket;
