//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// `POST /api/room` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRoomRequest {
    pub name: String,
}

/// Room record returned by the room endpoints
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    pub name: String,
    pub create_time: i64,
    pub update_time: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
