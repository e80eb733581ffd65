//! Signaling event protocol.
//!
//! Wire shape:
//!
//! ```text
//! { "type": string, "roomId": string, "deviceId": string,
//!   "timestamp": int64(ms), "payload": object }
//! ```
//!
//! The envelope is decoded first; the payload is decoded on demand into the
//! variant selected by `type` (see [`Signal`]). Forwarded events are written
//! back out with their payload untouched.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{
    entity::Device,
    error::SignalingError,
    value_object::{DeviceId, RoomId, Timestamp},
};

// ========================================
// EventType
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// server -> joining device: own record plus room snapshot
    Connect,
    /// server -> room: a device joined
    JoinRoom,
    /// server -> room: a device left
    LeaveRoom,
    CameraReady,
    MonitorReady,
    Offer,
    Answer,
    IceCandidate,
    /// server -> sender: processing failed
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::JoinRoom => "join_room",
            Self::LeaveRoom => "leave_room",
            Self::CameraReady => "camera_ready",
            Self::MonitorReady => "monitor_ready",
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "ice_candidate",
            Self::Error => "error",
        }
    }
}

impl FromStr for EventType {
    type Err = SignalingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect" => Ok(Self::Connect),
            "join_room" => Ok(Self::JoinRoom),
            "leave_room" => Ok(Self::LeaveRoom),
            "camera_ready" => Ok(Self::CameraReady),
            "monitor_ready" => Ok(Self::MonitorReady),
            "offer" => Ok(Self::Offer),
            "answer" => Ok(Self::Answer),
            "ice_candidate" => Ok(Self::IceCandidate),
            "error" => Ok(Self::Error),
            other => Err(SignalingError::UnknownEventType(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Payloads
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectPayload {
    pub device: Device,
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    pub device: Device,
}

/// Serialized as `{}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaveRoomPayload {}

/// `camera_ready` / `monitor_ready`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_device_id: Option<String>,
}

impl ReadyPayload {
    /// Target id if one was given and is non-empty.
    pub fn target(&self) -> Option<&str> {
        self.target_device_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// `offer` / `answer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptionPayload {
    pub target_device_id: String,
    #[serde(default)]
    pub sdp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidatePayload {
    pub target_device_id: String,
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default, rename = "sdpMLineIndex")]
    pub sdp_m_line_index: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

// ========================================
// Event
// ========================================

/// Event envelope as it travels on the wire.
///
/// `roomId`, `deviceId` and `timestamp` are optional on input because the
/// server overwrites them from the connection context anyway. `payload` is
/// kept as `None` when the key is absent and `Some(Value::Null)` when it is
/// an explicit `null`; only the former fails payload decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

// An explicit `null` is a present payload.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Event {
    /// Build a server-originated event.
    pub fn new<P: Serialize>(
        event_type: EventType,
        room_id: &RoomId,
        device_id: &DeviceId,
        timestamp: Timestamp,
        payload: &P,
    ) -> Result<Self, SignalingError> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| SignalingError::DecodeFailure(e.to_string()))?;
        Ok(Self {
            event_type: event_type.as_str().to_string(),
            room_id: room_id.as_str().to_string(),
            device_id: device_id.as_str().to_string(),
            timestamp: timestamp.value(),
            payload: Some(payload),
        })
    }

    pub fn connect(
        room_id: &RoomId,
        device: &Device,
        devices: Vec<Device>,
        timestamp: Timestamp,
    ) -> Result<Self, SignalingError> {
        let payload = ConnectPayload {
            device: device.clone(),
            devices,
        };
        Self::new(EventType::Connect, room_id, &device.id, timestamp, &payload)
    }

    pub fn join_room(
        room_id: &RoomId,
        device: &Device,
        timestamp: Timestamp,
    ) -> Result<Self, SignalingError> {
        let payload = JoinRoomPayload {
            device: device.clone(),
        };
        Self::new(EventType::JoinRoom, room_id, &device.id, timestamp, &payload)
    }

    pub fn leave_room(
        room_id: &RoomId,
        device_id: &DeviceId,
        timestamp: Timestamp,
    ) -> Result<Self, SignalingError> {
        Self::new(
            EventType::LeaveRoom,
            room_id,
            device_id,
            timestamp,
            &LeaveRoomPayload::default(),
        )
    }

    /// Error reply for the device that caused `err`.
    pub fn error(
        room_id: &RoomId,
        device_id: &DeviceId,
        err: &SignalingError,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            event_type: EventType::Error.as_str().to_string(),
            room_id: room_id.as_str().to_string(),
            device_id: device_id.as_str().to_string(),
            timestamp: timestamp.value(),
            payload: Some(serde_json::json!({ "error": err.to_string() })),
        }
    }

    /// Decode an inbound envelope.
    pub fn decode(text: &str) -> Result<Self, SignalingError> {
        serde_json::from_str(text).map_err(|e| SignalingError::DecodeFailure(e.to_string()))
    }

    pub fn encode(&self) -> Result<String, SignalingError> {
        serde_json::to_string(self).map_err(|e| SignalingError::DecodeFailure(e.to_string()))
    }

    /// Overwrite addressing and time with server-side values.
    pub fn stamp(&mut self, room_id: &RoomId, device_id: &DeviceId, timestamp: Timestamp) {
        self.room_id = room_id.as_str().to_string();
        self.device_id = device_id.as_str().to_string();
        self.timestamp = timestamp.value();
    }

    pub fn kind(&self) -> Result<EventType, SignalingError> {
        self.event_type.parse()
    }

    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, SignalingError> {
        let payload = self.payload.clone().ok_or_else(|| {
            SignalingError::DecodeFailure(format!("{} payload: missing", self.event_type))
        })?;
        serde_json::from_value(payload)
            .map_err(|e| SignalingError::DecodeFailure(format!("{} payload: {}", self.event_type, e)))
    }
}

// ========================================
// Signal
// ========================================

/// Client-to-server events, decoded into their typed payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    CameraReady(ReadyPayload),
    MonitorReady(ReadyPayload),
    Offer(SessionDescriptionPayload),
    Answer(SessionDescriptionPayload),
    IceCandidate(IceCandidatePayload),
}

impl Signal {
    /// Select the payload variant from `event.type` and decode it.
    ///
    /// Server-only types (`connect`, `join_room`, `leave_room`, `error`) are
    /// rejected like any unknown type.
    pub fn decode(event: &Event) -> Result<Self, SignalingError> {
        match event.kind()? {
            EventType::CameraReady => Ok(Self::CameraReady(ready_payload(event)?)),
            EventType::MonitorReady => Ok(Self::MonitorReady(ready_payload(event)?)),
            EventType::Offer => Ok(Self::Offer(event.parse_payload()?)),
            EventType::Answer => Ok(Self::Answer(event.parse_payload()?)),
            EventType::IceCandidate => Ok(Self::IceCandidate(event.parse_payload()?)),
            EventType::Connect | EventType::JoinRoom | EventType::LeaveRoom | EventType::Error => {
                Err(SignalingError::UnknownEventType(event.event_type.clone()))
            }
        }
    }
}

// A ready payload may be `null` or `{}`; both mean "no target".
fn ready_payload(event: &Event) -> Result<ReadyPayload, SignalingError> {
    let payload: Option<ReadyPayload> = event.parse_payload()?;
    Ok(payload.unwrap_or_default())
}
