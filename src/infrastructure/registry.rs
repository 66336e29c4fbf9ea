//! 接続→ルームのインデックス
//!
//! どの接続がどのルームに属しているかを O(1) で引けるようにする
//! 葉コンポーネント。create / join / disconnect のたびに Room Store の
//! クリティカルセクション内で更新されるため、ルームテーブルと常に
//! 整合した状態で読める。

use std::collections::HashMap;

use crate::domain::{ConnectionId, RoomCode};

/// インデックスのエントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub room_code: RoomCode,
    pub display_name: String,
}

/// 接続レジストリ
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, RegistryEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接続をルームに紐付ける
    pub fn bind(&mut self, connection: ConnectionId, room_code: RoomCode, display_name: String) {
        self.entries.insert(
            connection,
            RegistryEntry {
                room_code,
                display_name,
            },
        );
    }

    /// 接続の紐付けを解除し、解除したエントリを返す
    pub fn unbind(&mut self, connection: &ConnectionId) -> Option<RegistryEntry> {
        self.entries.remove(connection)
    }

    /// 接続が属するルームコードを引く
    pub fn room_of(&self, connection: &ConnectionId) -> Option<&RoomCode> {
        self.entries.get(connection).map(|entry| &entry.room_code)
    }

    /// 接続のエントリを引く
    pub fn entry_of(&self, connection: &ConnectionId) -> Option<&RegistryEntry> {
        self.entries.get(connection)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
