//! Watch-together video synchronization server library.
//!
//! This library implements the room-state synchronization engine behind a
//! watch-together service: rooms with a single host authority, a shared
//! playback clock, a host-managed video queue, and WebSocket-relayed events
//! that keep every member's player in lock-step with the host.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
