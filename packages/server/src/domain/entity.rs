//! Domain entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value_object::{DeviceId, DeviceStatus, DeviceType, RoomId, Timestamp};

/// One endpoint of a signaling session.
///
/// Serialized as the device record embedded in `connect` / `join_room`
/// payloads and returned by the device listing API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub room_id: RoomId,
    pub name: String,
    /// Free-form metadata, opaque to the server
    #[serde(default)]
    pub info: Map<String, Value>,
    pub create_time: Timestamp,
    pub update_time: Timestamp,
}

impl Device {
    /// Create a device in `Init` status.
    pub fn new(
        id: DeviceId,
        device_type: DeviceType,
        room_id: RoomId,
        name: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            device_type,
            status: DeviceStatus::Init,
            room_id,
            name,
            info: Map::new(),
            create_time: now,
            update_time: now,
        }
    }

    pub fn is_camera(&self) -> bool {
        self.device_type == DeviceType::Camera
    }

    pub fn is_monitor(&self) -> bool {
        self.device_type == DeviceType::Monitor
    }

    pub fn set_status(&mut self, status: DeviceStatus, now: Timestamp) {
        self.status = status;
        self.update_time = now;
    }
}
