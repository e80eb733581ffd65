//! UseCase: イベントルーティング
//!
//! 受信したイベントの種別に応じてデバイスのステータスを更新し、
//! 単一デバイスへの転送・複数デバイスへの転送・ルーム全体へのブロードキャストを行います。
//!
//! | type          | ステータス更新                         | 配送先                                      |
//! |---------------|----------------------------------------|---------------------------------------------|
//! | camera_ready  | 送信者 → Ready                         | target があればそのデバイス、無ければ Monitor |
//! | monitor_ready | 送信者 → Ready                         | target があればそのデバイス、無ければ Ready の Camera 全て |
//! | offer         | Ready の Camera → Streaming            | target                                      |
//! | answer        | Ready の Monitor → Receiving           | target                                      |
//! | ice_candidate | なし                                   | target                                      |
//!
//! 転送はイベントをそのまま（payload を変更せずに）書き出します。

use std::sync::Arc;

use futures_util::future::join_all;

use crate::domain::{
    DeviceId, DeviceStatus, DeviceType, Event, ReadyPayload, RoomId, RoomRepository,
    SignalingError, Signal,
};

/// イベントルーティングのユースケース
pub struct EventRouter {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl EventRouter {
    /// 新しい EventRouter を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 受信イベント 1 件の振り分けを実行
    ///
    /// # Arguments
    ///
    /// * `event` - 接続の値で `roomId` / `deviceId` を上書き済みのイベント
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 処理成功
    /// * `Err(SignalingError)` - デコード失敗・未知の種別（副作用なし）・転送失敗
    pub async fn process_event(&self, event: &Event) -> Result<(), SignalingError> {
        let signal = Signal::decode(event)?;
        let room_id = RoomId::new(event.room_id.clone())?;
        let sender = DeviceId::new(event.device_id.clone())?;

        match signal {
            Signal::CameraReady(payload) => {
                self.handle_camera_ready(&room_id, &sender, &payload, event)
                    .await
            }
            Signal::MonitorReady(payload) => {
                self.handle_monitor_ready(&room_id, &sender, &payload, event)
                    .await
            }
            Signal::Offer(payload) => {
                self.promote_if_ready(
                    &room_id,
                    &sender,
                    DeviceType::Camera,
                    DeviceStatus::Streaming,
                )
                .await;
                self.forward(&room_id, &payload.target_device_id, event).await
            }
            Signal::Answer(payload) => {
                self.promote_if_ready(
                    &room_id,
                    &sender,
                    DeviceType::Monitor,
                    DeviceStatus::Receiving,
                )
                .await;
                self.forward(&room_id, &payload.target_device_id, event).await
            }
            Signal::IceCandidate(payload) => {
                self.forward(&room_id, &payload.target_device_id, event).await
            }
        }
    }

    /// ルーム内の 1 デバイスへイベントを書き出す（リトライなし）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 書き込み成功
    /// * `Err(SignalingError)` - `RoomNotFound` / `DeviceNotFound` / `DeliveryFailure`
    pub async fn send_event_to_device(
        &self,
        room_id: &RoomId,
        target: &DeviceId,
        event: &Event,
    ) -> Result<(), SignalingError> {
        let connection = self.repository.get_connection(room_id, target).await?;
        connection.write(event.encode()?).await?;
        tracing::debug!(
            "Delivered '{}' from '{}' to '{}' in room '{}'",
            event.event_type,
            event.device_id,
            target,
            room_id
        );
        Ok(())
    }

    /// ルーム内の全デバイスへイベントを書き出す
    ///
    /// 宛先ごとの書き込み失敗はログに残してスキップします。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 全宛先への配送を試みた
    /// * `Err(SignalingError)` - ルームが無い、またはイベントをエンコードできない
    pub async fn broadcast_event(
        &self,
        room_id: &RoomId,
        event: &Event,
    ) -> Result<(), SignalingError> {
        let connections = self.repository.get_connections(room_id).await?;
        let text = event.encode()?;

        let deliveries = connections.iter().map(|(device_id, connection)| {
            let text = text.clone();
            async move { (device_id, connection.write(text).await) }
        });
        for (device_id, result) in join_all(deliveries).await {
            match result {
                Ok(()) => tracing::debug!(
                    "Broadcasted '{}' to '{}' in room '{}'",
                    event.event_type,
                    device_id,
                    room_id
                ),
                Err(e) => tracing::warn!(
                    "Failed to broadcast '{}' to '{}' in room '{}': {}",
                    event.event_type,
                    device_id,
                    room_id,
                    e
                ),
            }
        }
        Ok(())
    }

    async fn handle_camera_ready(
        &self,
        room_id: &RoomId,
        sender: &DeviceId,
        payload: &ReadyPayload,
        event: &Event,
    ) -> Result<(), SignalingError> {
        self.repository
            .update_device_status(room_id, sender, DeviceStatus::Ready)
            .await?;

        if let Some(target) = payload.target() {
            return self.forward(room_id, target, event).await;
        }
        match self.repository.get_monitor(room_id).await? {
            Some(monitor) => self.send_event_to_device(room_id, &monitor.id, event).await,
            None => {
                tracing::debug!(
                    "Camera '{}' is ready but room '{}' has no monitor yet",
                    sender,
                    room_id
                );
                Ok(())
            }
        }
    }

    async fn handle_monitor_ready(
        &self,
        room_id: &RoomId,
        sender: &DeviceId,
        payload: &ReadyPayload,
        event: &Event,
    ) -> Result<(), SignalingError> {
        self.repository
            .update_device_status(room_id, sender, DeviceStatus::Ready)
            .await?;

        if let Some(target) = payload.target() {
            return self.forward(room_id, target, event).await;
        }

        // Cameras that have not announced readiness yet are skipped.
        let ready_cameras: Vec<DeviceId> = self
            .repository
            .get_cameras(room_id)
            .await?
            .into_iter()
            .filter(|camera| camera.status == DeviceStatus::Ready)
            .map(|camera| camera.id)
            .collect();

        let deliveries = ready_cameras.iter().map(|camera| async move {
            let result = self.send_event_to_device(room_id, camera, event).await;
            (camera, result)
        });
        for (camera, result) in join_all(deliveries).await {
            if let Err(e) = result {
                tracing::warn!(
                    "Failed to deliver monitor_ready to camera '{}' in room '{}': {}",
                    camera,
                    room_id,
                    e
                );
            }
        }
        Ok(())
    }

    /// `Ready -> promoted` for a sender of the expected type. Failures are
    /// logged only.
    async fn promote_if_ready(
        &self,
        room_id: &RoomId,
        sender: &DeviceId,
        expected_type: DeviceType,
        promoted: DeviceStatus,
    ) {
        let device = match self.repository.get_device(room_id, sender).await {
            Ok(device) => device,
            Err(e) => {
                tracing::warn!("Failed to look up sender '{}': {}", sender, e);
                return;
            }
        };
        if device.device_type != expected_type || device.status != DeviceStatus::Ready {
            return;
        }
        if let Err(e) = self
            .repository
            .update_device_status(room_id, sender, promoted)
            .await
        {
            tracing::warn!("Failed to set '{}' to {}: {}", sender, promoted, e);
        }
    }

    async fn forward(
        &self,
        room_id: &RoomId,
        target: &str,
        event: &Event,
    ) -> Result<(), SignalingError> {
        let target = DeviceId::new(target.to_string())
            .map_err(|_| SignalingError::DeviceNotFound(target.to_string()))?;
        self.send_event_to_device(room_id, &target, event).await
    }
}
