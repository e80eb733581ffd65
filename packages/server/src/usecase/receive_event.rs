//! UseCase: 受信メッセージ処理
//!
//! 読み込みループが受け取ったテキストを 1 件ずつ処理します。
//! デコード失敗・処理失敗はどちらも送信者にだけ `error` イベントを返し、接続は維持します。

use std::sync::Arc;

use peerlink_shared::time::Clock;

use crate::domain::{DeviceId, Event, RoomId, SafeConnection, SignalingError, Timestamp};

use super::EventRouter;

/// 受信メッセージ処理のユースケース
pub struct ReceiveEventUseCase {
    /// イベントの振り分け先
    router: Arc<EventRouter>,
    /// 受信イベントと error イベントのタイムスタンプ
    clock: Arc<dyn Clock>,
}

impl ReceiveEventUseCase {
    /// 新しい ReceiveEventUseCase を作成
    pub fn new(router: Arc<EventRouter>, clock: Arc<dyn Clock>) -> Self {
        Self { router, clock }
    }

    /// 受信メッセージ 1 件の処理を実行
    ///
    /// デコード後、`roomId` / `deviceId` / `timestamp` を接続の値で上書きしてから
    /// ルーターへ渡します。
    ///
    /// # Arguments
    ///
    /// * `room_id` - 送信者が参加しているルームの ID
    /// * `device_id` - 送信者のデバイス ID
    /// * `connection` - 送信者の接続（error イベントの返信先）
    /// * `text` - 受信したテキストフレーム
    ///
    /// # Returns
    ///
    /// * `None` - 処理成功
    /// * `Some(SignalingError)` - 送信者に error イベントとして返した失敗
    pub async fn execute(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        connection: &SafeConnection,
        text: &str,
    ) -> Option<SignalingError> {
        let mut event = match Event::decode(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Malformed event from '{}': {}", device_id, e);
                self.reply_error(room_id, device_id, connection, &e).await;
                return Some(e);
            }
        };

        // roomId / deviceId / timestamp always come from the connection.
        event.stamp(room_id, device_id, self.now());
        tracing::debug!(
            "Received '{}' from '{}' in room '{}'",
            event.event_type,
            device_id,
            room_id
        );

        match self.router.process_event(&event).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    "Failed to process '{}' from '{}': {}",
                    event.event_type,
                    device_id,
                    e
                );
                self.reply_error(room_id, device_id, connection, &e).await;
                Some(e)
            }
        }
    }

    async fn reply_error(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        connection: &SafeConnection,
        err: &SignalingError,
    ) {
        let reply = Event::error(room_id, device_id, err, self.now());
        let result = match reply.encode() {
            Ok(text) => connection.write(text).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::debug!("Could not report error to '{}': {}", device_id, e);
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        domain::{DeviceStatus, DeviceType, ErrorPayload, EventType, RoomRepository},
        test_support::{NOW, channel_connection, device, device_id, drain, room_id, test_repository},
    };
    use peerlink_shared::time::FixedClock;

    const ROOM: &str = "868686";

    #[tokio::test]
    async fn test_malformed_event_yields_single_error_and_keeps_going() {
        // テスト項目: 不正なイベントには error が 1 件だけ返り、その後の正しいイベントは処理される
        // given (前提条件):
        let repo = test_repository();
        let (cam_conn, mut cam_rx) = channel_connection();
        let (mon_conn, mut mon_rx) = channel_connection();
        repo.join_room(&room_id(ROOM), device("cam", DeviceType::Camera, ROOM), cam_conn.clone())
            .await
            .unwrap();
        repo.join_room(&room_id(ROOM), device("mon", DeviceType::Monitor, ROOM), mon_conn)
            .await
            .unwrap();
        let router = Arc::new(EventRouter::new(repo.clone()));
        let usecase = ReceiveEventUseCase::new(router, Arc::new(FixedClock::new(NOW)));

        // when (操作):
        let failure = usecase
            .execute(&room_id(ROOM), &device_id("cam"), &cam_conn, "{not json")
            .await;

        // then (期待する結果):
        assert!(matches!(failure, Some(SignalingError::DecodeFailure(_))));
        let replies = drain(&mut cam_rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind(), Ok(EventType::Error));
        let payload: ErrorPayload = replies[0].parse_payload().unwrap();
        assert!(payload.error.starts_with("invalid event format"));
        assert!(drain(&mut mon_rx).is_empty());

        // when (操作): 続けて正しいイベントを送る
        let failure = usecase
            .execute(
                &room_id(ROOM),
                &device_id("cam"),
                &cam_conn,
                r#"{"type":"camera_ready","payload":{}}"#,
            )
            .await;

        // then (期待する結果):
        assert!(failure.is_none());
        assert_eq!(drain(&mut mon_rx).len(), 1);
    }

    #[tokio::test]
    async fn test_client_supplied_addressing_is_overwritten() {
        // テスト項目: クライアントが指定した roomId / deviceId / timestamp はサーバー側の値で上書きされる
        // given (前提条件):
        let repo = test_repository();
        let (cam_conn, _cam_rx) = channel_connection();
        let (mon_conn, mut mon_rx) = channel_connection();
        repo.join_room(&room_id(ROOM), device("cam", DeviceType::Camera, ROOM), cam_conn.clone())
            .await
            .unwrap();
        repo.join_room(&room_id(ROOM), device("mon", DeviceType::Monitor, ROOM), mon_conn)
            .await
            .unwrap();
        let router = Arc::new(EventRouter::new(repo.clone()));
        let usecase = ReceiveEventUseCase::new(router, Arc::new(FixedClock::new(NOW)));
        let text = json!({
            "type": "offer",
            "roomId": "111111",
            "deviceId": "mon",
            "timestamp": 1,
            "payload": {"targetDeviceId": "mon", "sdp": "v=0"},
        })
        .to_string();

        // when (操作):
        usecase
            .execute(&room_id(ROOM), &device_id("cam"), &cam_conn, &text)
            .await;

        // then (期待する結果):
        let received = drain(&mut mon_rx);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].room_id, ROOM);
        assert_eq!(received[0].device_id, "cam");
        assert_eq!(received[0].timestamp, NOW);
        assert_eq!(
            received[0].payload,
            Some(json!({"targetDeviceId": "mon", "sdp": "v=0"}))
        );
    }

    #[tokio::test]
    async fn test_processing_failure_is_reported_to_sender_only() {
        // テスト項目: 処理に失敗したイベントはエラー内容が送信者にだけ返される
        // given (前提条件):
        let repo = test_repository();
        let (cam_conn, mut cam_rx) = channel_connection();
        let (mon_conn, mut mon_rx) = channel_connection();
        repo.join_room(&room_id(ROOM), device("cam", DeviceType::Camera, ROOM), cam_conn.clone())
            .await
            .unwrap();
        repo.join_room(&room_id(ROOM), device("mon", DeviceType::Monitor, ROOM), mon_conn)
            .await
            .unwrap();
        let router = Arc::new(EventRouter::new(repo.clone()));
        let usecase = ReceiveEventUseCase::new(router, Arc::new(FixedClock::new(NOW)));

        // when (操作):
        let failure = usecase
            .execute(
                &room_id(ROOM),
                &device_id("cam"),
                &cam_conn,
                r#"{"type":"teleport","payload":{}}"#,
            )
            .await;

        // then (期待する結果):
        assert_eq!(
            failure,
            Some(SignalingError::UnknownEventType("teleport".to_string()))
        );
        let replies = drain(&mut cam_rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].device_id, "cam");
        assert_eq!(
            replies[0].payload,
            Some(json!({"error": "unknown event type 'teleport'"}))
        );
        assert!(drain(&mut mon_rx).is_empty());
    }

    #[tokio::test]
    async fn test_ready_without_payload_is_rejected() {
        // テスト項目: payload キーの無い camera_ready は error が返り、ステータスも変わらず転送もされない
        // given (前提条件):
        let repo = test_repository();
        let (cam_conn, mut cam_rx) = channel_connection();
        let (mon_conn, mut mon_rx) = channel_connection();
        repo.join_room(&room_id(ROOM), device("cam", DeviceType::Camera, ROOM), cam_conn.clone())
            .await
            .unwrap();
        repo.join_room(&room_id(ROOM), device("mon", DeviceType::Monitor, ROOM), mon_conn)
            .await
            .unwrap();
        let router = Arc::new(EventRouter::new(repo.clone()));
        let usecase = ReceiveEventUseCase::new(router, Arc::new(FixedClock::new(NOW)));

        // when (操作):
        let failure = usecase
            .execute(&room_id(ROOM), &device_id("cam"), &cam_conn, r#"{"type":"camera_ready"}"#)
            .await;

        // then (期待する結果):
        assert_eq!(
            failure,
            Some(SignalingError::DecodeFailure(
                "camera_ready payload: missing".to_string()
            ))
        );
        let replies = drain(&mut cam_rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].kind(), Ok(EventType::Error));
        assert!(drain(&mut mon_rx).is_empty());
        assert_eq!(
            repo.get_device(&room_id(ROOM), &device_id("cam"))
                .await
                .unwrap()
                .status,
            DeviceStatus::Connected
        );
    }
}
