//! UseCase: デバイス接続処理
//!
//! 1. 接続パラメータの検証（roomId / deviceId / deviceType）
//! 2. ルームへの join（ルームが無ければ暗黙的に作成）
//! 3. 接続したデバイス自身へ `connect` イベント（自身のレコード + join 後のデバイス一覧）
//! 4. ルーム全体へ `join_room` イベント（接続したデバイス自身も含む）

use std::sync::Arc;

use peerlink_shared::time::Clock;

use crate::domain::{
    Device, DeviceId, DeviceType, Event, RoomId, RoomRepository, SafeConnection, SignalingError,
    Timestamp,
};

use super::EventRouter;

/// 検証済みの接続パラメータ
#[derive(Debug, Clone, PartialEq)]
pub struct JoinRequest {
    /// 参加するルームの ID
    pub room_id: RoomId,
    /// 接続するデバイスの ID
    pub device_id: DeviceId,
    /// camera / monitor
    pub device_type: DeviceType,
    /// 表示名（省略時はデバイス ID）
    pub name: String,
}

impl JoinRequest {
    /// 生の接続パラメータを検証
    ///
    /// # Arguments
    ///
    /// * `room_id` - パスの roomId
    /// * `device_id` - クエリの deviceId
    /// * `device_type` - クエリの deviceType（`camera` / `monitor`）
    /// * `name` - クエリの name（空または省略時はデバイス ID）
    ///
    /// # Returns
    ///
    /// * `Ok(JoinRequest)` - 検証成功
    /// * `Err(SignalingError::InvalidRequest)` - いずれかのパラメータが不正
    pub fn parse(
        room_id: &str,
        device_id: &str,
        device_type: &str,
        name: Option<&str>,
    ) -> Result<Self, SignalingError> {
        let room_id = RoomId::new(room_id.to_string())?;
        let device_id = DeviceId::new(device_id.to_string())?;
        let device_type = device_type.parse::<DeviceType>()?;
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => device_id.as_str().to_string(),
        };
        Ok(Self {
            room_id,
            device_id,
            device_type,
            name,
        })
    }
}

/// デバイス接続のユースケース
pub struct ConnectDeviceUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// `join_room` のブロードキャストに使うルーター
    router: Arc<EventRouter>,
    /// デバイスとイベントのタイムスタンプ
    clock: Arc<dyn Clock>,
}

impl ConnectDeviceUseCase {
    /// 新しい ConnectDeviceUseCase を作成
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

    /// デバイス接続を実行
    ///
    /// join 成功後の `connect` / `join_room` の送信失敗はログに残すだけで、
    /// 呼び出し側は `Ok` を受け取った時点で通常の切断処理を必ず実行します。
    ///
    /// # Arguments
    ///
    /// * `request` - 検証済みの接続パラメータ
    /// * `connection` - デバイスへの書き込み用接続
    ///
    /// # Returns
    ///
    /// * `Ok(Device)` - 登録されたデバイス（ステータスは Connected）
    /// * `Err(SignalingError)` - join 失敗（`MonitorAlreadyPresent` など）。
    ///   デバイスは登録されず、イベントも送られないので接続を閉じること
    pub async fn execute(
        &self,
        request: JoinRequest,
        connection: Arc<SafeConnection>,
    ) -> Result<Device, SignalingError> {
        let now = self.now();
        let room_id = request.room_id;
        let device = Device::new(
            request.device_id,
            request.device_type,
            room_id.clone(),
            request.name,
            now,
        );

        let joined = match self
            .repository
            .join_room(&room_id, device, Arc::clone(&connection))
            .await
        {
            Ok(joined) => joined,
            Err(e) => {
                tracing::warn!("Rejected join into room '{}': {}", room_id, e);
                return Err(e);
            }
        };

        if let Err(e) = self.send_connect(&room_id, &joined, &connection).await {
            tracing::warn!("Failed to send connect to '{}': {}", joined.id, e);
        }
        if let Err(e) = self.announce(&room_id, &joined).await {
            tracing::warn!("Failed to broadcast join_room for '{}': {}", joined.id, e);
        }

        Ok(joined)
    }

    async fn send_connect(
        &self,
        room_id: &RoomId,
        joined: &Device,
        connection: &SafeConnection,
    ) -> Result<(), SignalingError> {
        let devices = self.repository.get_devices(room_id).await?;
        let event = Event::connect(room_id, joined, devices, self.now())?;
        connection.write(event.encode()?).await
    }

    async fn announce(&self, room_id: &RoomId, joined: &Device) -> Result<(), SignalingError> {
        let event = Event::join_room(room_id, joined, self.now())?;
        self.router.broadcast_event(room_id, &event).await
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
