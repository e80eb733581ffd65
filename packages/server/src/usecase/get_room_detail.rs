//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository, SignalingError};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    /// 新しい GetRoomDetailUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム詳細取得を実行
    ///
    /// # Arguments
    ///
    /// * `room_id` - パスの roomId（未検証）
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Room>)` - 該当するルーム
    /// * `Err(SignalingError::RoomNotFound)` - ルームが無い、または ID の形式が不正
    pub async fn execute(&self, room_id: &str) -> Result<Arc<Room>, SignalingError> {
        let room_id = RoomId::new(room_id.to_string())
            .map_err(|_| SignalingError::RoomNotFound(room_id.to_string()))?;
        self.repository.get_room(&room_id).await
    }
}
