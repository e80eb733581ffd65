//! UseCase: デバイス切断処理
//!
//! 切断時は必ず「接続のクローズ → ルームからの退出 → 残りのデバイスへ `leave_room`」
//! の順で実行します。読み込みループがどのように終了したかには依存しません。

use std::sync::Arc;

use peerlink_shared::time::Clock;

use crate::domain::{
    DeviceId, Event, LeaveOutcome, RoomId, RoomRepository, SafeConnection, SignalingError,
    Timestamp,
};

use super::EventRouter;

/// デバイス切断のユースケース
pub struct DisconnectDeviceUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// `leave_room` のブロードキャストに使うルーター
    router: Arc<EventRouter>,
    /// `leave_room` イベントのタイムスタンプ
    clock: Arc<dyn Clock>,
}

impl DisconnectDeviceUseCase {
    /// 新しい DisconnectDeviceUseCase を作成
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        router: Arc<EventRouter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            router,
            clock,
        }
    }

    /// デバイス切断を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - 接続時に参加したルームの ID
    /// * `device_id` - 切断するデバイスの ID
    /// * `connection` - 切断する接続（この接続で登録されたエントリだけが削除される）
    ///
    /// # Returns
    ///
    /// * `LeaveOutcome` - 削除されたデバイスと、ルームが削除されたかどうか。
    ///   切断処理自体は失敗しない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        connection: &Arc<SafeConnection>,
    ) -> LeaveOutcome {
        // 1. 接続のクローズ
        if let Err(e) = connection.close().await {
            tracing::debug!("Closing connection of '{}' failed: {}", device_id, e);
        }

        // 2. ルームからの退出
        let outcome = self.repository.leave_room(room_id, device_id, connection).await;
        if outcome.removed.is_none() || outcome.room_deleted {
            return outcome;
        }

        // 3. 残りのデバイスへ leave_room

        let now = Timestamp::new(self.clock.now_millis());
        let result = match Event::leave_room(room_id, device_id, now) {
            Ok(event) => self.router.broadcast_event(room_id, &event).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {}
            Err(SignalingError::RoomNotFound(_)) => {
                tracing::debug!("Room '{}' is gone; no leave_room to send", room_id);
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast leave_room for '{}': {}", device_id, e);
            }
        }

        outcome
    }
}
