//! Conversion logic between domain models and DTOs.

use crate::{
    domain::{Room, SignalingError},
    infrastructure::dto::http as dto,
};

// ========================================
// Domain Model → DTO
// ========================================

impl From<&Room> for dto::RoomDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id().as_str().to_string(),
            name: room.name().to_string(),
            create_time: room.create_time().value(),
            update_time: room.update_time().value(),
        }
    }
}

impl From<&SignalingError> for dto::ErrorResponse {
    fn from(err: &SignalingError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomId, Timestamp};

    #[test]
    fn test_room_to_dto() {
        // テスト項目: Room から RoomDto への変換
        // given (前提条件):
        let room = Room::new(
            RoomId::new("777777".to_string()).unwrap(),
            "Garage".to_string(),
            Timestamp::new(1000),
        );

        // when (操作):
        let dto = dto::RoomDto::from(&room);

        // then (期待する結果):
        assert_eq!(
            dto,
            dto::RoomDto {
                id: "777777".to_string(),
                name: "Garage".to_string(),
                create_time: 1000,
                update_time: 1000,
            }
        );
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            serde_json::json!({
                "id": "777777",
                "name": "Garage",
                "createTime": 1000,
                "updateTime": 1000,
            })
        );
    }

    #[test]
    fn test_error_to_dto() {
        // テスト項目: SignalingError のメッセージがそのまま error フィールドになる
        // given (前提条件):
        let err = SignalingError::RoomNotFound("123456".to_string());

        // when (操作):
        let dto = dto::ErrorResponse::from(&err);

        // then (期待する結果):
        assert_eq!(dto.error, "room '123456' not found");
    }
}
