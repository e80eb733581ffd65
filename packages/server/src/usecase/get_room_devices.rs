//! UseCase: ルーム内デバイス一覧取得

use std::sync::Arc;

use crate::domain::{Device, RoomId, RoomRepository, SignalingError};

/// ルーム内デバイス一覧取得のユースケース
pub struct GetRoomDevicesUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDevicesUseCase {
    /// 新しい GetRoomDevicesUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム内デバイス一覧取得を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - パスの roomId（未検証）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Device>)` - ルーム内のデバイス（ID 順）
    /// * `Err(SignalingError::RoomNotFound)` - ルームが無い、または ID の形式が不正
    pub async fn execute(&self, room_id: &str) -> Result<Vec<Device>, SignalingError> {
        let room_id = RoomId::new(room_id.to_string())
            .map_err(|_| SignalingError::RoomNotFound(room_id.to_string()))?;
        let mut devices = self.repository.get_devices(&room_id).await?;
        devices.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(devices)
    }
}
