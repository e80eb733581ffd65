//! Shared fixtures for unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use peerlink_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionWriter, Device, DeviceId, DeviceType, Event, RoomId, SafeConnection,
        SignalingError, Timestamp,
    },
    infrastructure::repository::InMemoryRoomRepository,
};

/// Fixed "now" used by every test repository.
pub(crate) const NOW: i64 = 1_700_000_000_000;

/// Connection writer that forwards every frame to a channel.
///
/// `close` drops the sender, so the receiving side observes the end of the
/// stream once buffered frames are drained.
pub(crate) struct ChannelWriter {
    tx: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl ConnectionWriter for ChannelWriter {
    async fn write_text(&mut self, text: String) -> Result<(), SignalingError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| SignalingError::DeliveryFailure("connection closed".to_string()))?;
        tx.send(text)
            .map_err(|e| SignalingError::DeliveryFailure(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SignalingError> {
        self.tx = None;
        Ok(())
    }
}

pub(crate) fn channel_connection() -> (Arc<SafeConnection>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = Arc::new(SafeConnection::new(ChannelWriter { tx: Some(tx) }));
    (connection, rx)
}

/// Decode every frame received so far.
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(text) = rx.try_recv() {
        events.push(Event::decode(&text).unwrap());
    }
    events
}

pub(crate) fn test_repository() -> Arc<InMemoryRoomRepository> {
    Arc::new(InMemoryRoomRepository::new(Arc::new(FixedClock::new(NOW))))
}

pub(crate) fn room_id(raw: &str) -> RoomId {
    RoomId::new(raw.to_string()).unwrap()
}

pub(crate) fn device_id(raw: &str) -> DeviceId {
    DeviceId::new(raw.to_string()).unwrap()
}

/// A device in `Init` status, named after its id.
pub(crate) fn device(id: &str, device_type: DeviceType, room: &str) -> Device {
    Device::new(
        device_id(id),
        device_type,
        room_id(room),
        id.to_string(),
        Timestamp::new(0),
    )
}
