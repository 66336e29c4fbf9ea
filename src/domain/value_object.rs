//! ドメイン層の値オブジェクト
//!
//! 接続 ID・ルームコード・表示名・メッセージ本文などのプリミティブを
//! 検証付きの型として定義します。不正な値はコンストラクタで弾かれるため、
//! ドメイン層の内部では常に有効な値だけが流通します。

use std::fmt;

use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

/// ルームコードの長さ（6 文字固定）
pub const ROOM_CODE_LEN: usize = 6;

/// ルームコードに使用できる文字（紛らわしくない英大文字と数字）
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const DISPLAY_NAME_MAX_LEN: usize = 64;
const MESSAGE_MAX_LEN: usize = 500;

/// 値オブジェクトの検証エラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("room code must be 6 characters from [A-Z0-9], got '{0}'")]
    InvalidRoomCode(String),

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("display name is too long ({0} characters)")]
    DisplayNameTooLong(usize),

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("message is too long ({0} characters)")]
    MessageTooLong(usize),
}

/// 接続 ID
///
/// トランスポート層が接続ごとに採番する不透明な識別子。
/// サーバー側では UUID v4 を使用します。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueError> {
        if value.trim().is_empty() {
            return Err(ValueError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    /// 新しい接続 ID を採番
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ルームコード
///
/// 人間が共有するための 6 文字の識別子。生成時に常駐ルームと衝突
/// チェックされ、ルームの生存中は不変です。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let valid = value.len() == ROOM_CODE_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if !valid {
            return Err(ValueError::InvalidRoomCode(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// ルームコードのファクトリ
///
/// 生成されるコードは常に `ROOM_CODE_ALPHABET` から `ROOM_CODE_LEN` 文字。
/// 常駐ルームとの衝突チェックは Room Store 側の責務です。
pub struct RoomCodeFactory;

impl RoomCodeFactory {
    pub fn generate() -> RoomCode {
        let mut rng = rand::thread_rng();
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_ALPHABET[rng.gen_range(0..ROOM_CODE_ALPHABET.len())] as char)
            .collect();
        RoomCode(code)
    }
}

/// 表示名
///
/// 認証されないラベル。空白のみの名前は拒否し、クライアントが名前を
/// 送らなかった場合は `anonymous()` を使用します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
            return Err(ValueError::DisplayNameTooLong(trimmed.chars().count()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// 名前未指定時のフォールバック
    pub fn anonymous() -> Self {
        Self("Anonymous".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// チャットメッセージ本文
///
/// 前後の空白を除去した上で、空のメッセージを拒否します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueError::EmptyMessage);
        }
        if trimmed.chars().count() > MESSAGE_MAX_LEN {
            return Err(ValueError::MessageTooLong(trimmed.chars().count()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
