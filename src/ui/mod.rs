//! UI 層
//!
//! axum のルーター・WebSocket / HTTP ハンドラ・アプリケーション状態を
//! 提供します。

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
