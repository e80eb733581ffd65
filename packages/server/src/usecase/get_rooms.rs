//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム一覧取得を実行
    ///
    /// # Returns
    ///
    /// * `Vec<Arc<Room>>` - 現在存在するルーム（ID 順、無ければ空）
    pub async fn execute(&self) -> Vec<Arc<Room>> {
        let mut rooms = self.repository.list_rooms().await;
        rooms.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
        rooms
    }
}
