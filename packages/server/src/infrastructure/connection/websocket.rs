//! WebSocket を使った ConnectionWriter 実装
//!
//! WebSocket の受け付けと分割は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は分割後の送信側（`SplitSink`）だけを受け取り、`SafeConnection` の中に閉じ込めます。
//! 受信側は UI 層の読み込みループだけが保持します。

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};

use crate::domain::{ConnectionWriter, SignalingError};

pub struct WebSocketWriter {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketWriter {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ConnectionWriter for WebSocketWriter {
    async fn write_text(&mut self, text: String) -> Result<(), SignalingError> {
        self.sink
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| SignalingError::DeliveryFailure(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SignalingError> {
        self.sink
            .close()
            .await
            .map_err(|e| SignalingError::DeliveryFailure(e.to_string()))
    }
}
