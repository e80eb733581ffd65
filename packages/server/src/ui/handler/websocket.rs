//! WebSocket connection handler.
//!
//! Owns the lifecycle of one device connection: parameter validation,
//! join, the read loop, and teardown. The socket's write half is moved into
//! a `SafeConnection` right after the upgrade and never used directly again.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::stream::StreamExt;
use serde::Deserialize;

use crate::{
    domain::SafeConnection,
    infrastructure::connection::WebSocketWriter,
    ui::state::AppState,
    usecase::JoinRequest,
};

use super::http::ApiError;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectQuery {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_type: String,
    pub name: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
) -> Response {
    let request = match JoinRequest::parse(
        &room_id,
        &query.device_id,
        &query.device_type,
        query.name.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected connection to room '{}': {}", room_id, e);
            return ApiError::from(e).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, request))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, request: JoinRequest) {
    let (sender, mut receiver) = socket.split();
    let connection = Arc::new(SafeConnection::new(WebSocketWriter::new(sender)));
    let room_id = request.room_id.clone();
    let device_id = request.device_id.clone();

    if state
        .connect_device_usecase
        .execute(request, Arc::clone(&connection))
        .await
        .is_err()
    {
        // Rejected join: close without any event traffic.
        if let Err(e) = connection.close().await {
            tracing::debug!("Closing rejected connection failed: {}", e);
        }
        return;
    }

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("WebSocket read error from '{}': {}", device_id, e);
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Message::Close(_) => {
                tracing::info!("Device '{}' requested close", device_id);
                break;
            }
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        state
            .receive_event_usecase
            .execute(&room_id, &device_id, &connection, &text)
            .await;
    }

    state
        .disconnect_device_usecase
        .execute(&room_id, &device_id, &connection)
        .await;
}
