//! ドメイン層のエラー定義
//!
//! 同期エンジンが外部に見せる失敗は意図的に少なく、ほとんどの失敗は
//! 「黙って無視する」ことが仕様です。どのエラーをクライアントへ返し、
//! どのエラーを debug ログだけで落とすかはハンドラ層が判断します。

use thiserror::Error;

/// ルーム状態同期エンジンのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// 指定コードのルームが常駐していない（join のみクライアントへ通知される）
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    /// ホスト以外からの特権操作、またはどのルームにも属さない接続からの操作。
    /// クライアントへは何も返さず黙って破棄する。
    #[error("connection is not authorized to mutate the room")]
    NotAuthorized,

    /// キューが空の状態での play-next / video-ended
    #[error("queue is empty")]
    EmptyQueue,

    /// trim 後に空になったチャットメッセージ
    #[error("message is empty")]
    EmptyMessage,
}

/// メッセージ送信のエラー
#[derive(Debug, Error)]
pub enum PushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// 永続ミラーのエラー
///
/// ミラーは best-effort であり、このエラーがインメモリ状態の変更を
/// 巻き戻すことはない。呼び出し側は warn ログを出して処理を続行する。
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("mirror write failed: {0}")]
    WriteFailed(String),
}
