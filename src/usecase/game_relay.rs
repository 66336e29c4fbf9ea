//! UseCase: ミニゲームイベント中継
//!
//! start-game / game-move / game-reset / game-state-sync の 4 イベントは
//! 純粋なパススルーです。任意のメンバーが送信でき、ペイロードは検証
//! されずにルームの他メンバーへそのまま転送され、サーバーは何も保存
//! しません。ゲームの識別や手の合法性の検証はクライアント側の責務です。

use std::sync::Arc;

use crate::domain::{ConnectionId, MemberContext, RoomStore};

/// ミニゲームイベント中継のユースケース
pub struct RelayGameEventUseCase {
    /// Room Store（所属ルームの解決に使用）
    store: Arc<dyn RoomStore>,
}

impl RelayGameEventUseCase {
    /// 新しい RelayGameEventUseCase を作成
    pub fn new(store: Arc<dyn RoomStore>) -> Self {
        Self { store }
    }

    /// 送信者の所属ルームと表示名を解決する
    ///
    /// どのルームにも属していなければ None（イベントは黙って破棄される）。
    pub async fn resolve_sender(&self, connection: &ConnectionId) -> Option<MemberContext> {
        self.store.member_context(connection).await
    }
}
