//! UseCase: ルーム作成

use std::sync::Arc;

use crate::domain::{Room, RoomRepository, SignalingError};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `name` - ルーム名
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<Room>)` - 未使用の 6 桁 ID で作成された空のルーム
    /// * `Err(SignalingError::ExhaustedId)` - 空き ID が見つからない
    pub async fn execute(&self, name: String) -> Result<Arc<Room>, SignalingError> {
        self.repository.create_room(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_repository;

    #[tokio::test]
    async fn test_create_room_is_retrievable() {
        // テスト項目: 作成したルームが ID で取得できる
        // given (前提条件):
        let repo = test_repository();
        let usecase = CreateRoomUseCase::new(repo.clone());

        // when (操作):
        let room = usecase.execute("Nursery".to_string()).await.unwrap();

        // then (期待する結果):
        let fetched = repo.get_room(room.id()).await.unwrap();
        assert_eq!(fetched.name(), "Nursery");
        assert!(fetched.is_empty());
    }
}
