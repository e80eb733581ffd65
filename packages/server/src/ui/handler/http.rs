//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{Device, SignalingError},
    infrastructure::dto::http::{CreateRoomRequest, ErrorResponse, HealthResponse, RoomDto},
    ui::state::AppState,
};

/// `SignalingError` rendered as `{ "error": message }` with a matching status.
pub struct ApiError(SignalingError);

impl From<SignalingError> for ApiError {
    fn from(err: SignalingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SignalingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SignalingError::RoomNotFound(_) | SignalingError::DeviceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SignalingError::MonitorAlreadyPresent(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create a room
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRoomRequest>, JsonRejection>,
) -> Result<Json<RoomDto>, Response> {
    let Json(request) = body.map_err(|e| {
        tracing::warn!("Rejected create room request: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid request".to_string(),
            }),
        )
            .into_response()
    })?;

    let room = state
        .create_room_usecase
        .execute(request.name)
        .await
        .map_err(|e| ApiError(e).into_response())?;
    Ok(Json(RoomDto::from(room.as_ref())))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomDto>> {
    let rooms = state.get_rooms_usecase.execute().await;
    Json(rooms.iter().map(|room| RoomDto::from(room.as_ref())).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDto>, ApiError> {
    let room = state.get_room_detail_usecase.execute(&room_id).await?;
    Ok(Json(RoomDto::from(room.as_ref())))
}

/// Get the devices of a room
pub async fn get_room_devices(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    let devices = state.get_room_devices_usecase.execute(&room_id).await?;
    Ok(Json(devices))
}
