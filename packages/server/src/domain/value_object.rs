//! Value objects
//!
//! 検証済みの識別子・列挙値をドメイン全体で使い回すための型です。

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

// ========================================
// RoomId
// ========================================

/// Six-digit room identifier in `[100000, 999999]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Smallest generated room number
    pub const MIN: u32 = 100_000;
    /// Largest generated room number
    pub const MAX: u32 = 999_999;

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        let well_formed = value.len() == 6
            && value.bytes().all(|b| b.is_ascii_digit())
            && value
                .parse::<u32>()
                .is_ok_and(|n| (Self::MIN..=Self::MAX).contains(&n));
        if !well_formed {
            return Err(ValueObjectError::InvalidRoomId(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random room id generator.
///
/// Uniqueness against active rooms is the repository's job; this only
/// produces well-formed candidates.
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        let n = rand::thread_rng().gen_range(RoomId::MIN..=RoomId::MAX);
        RoomId(n.to_string())
    }
}

// ========================================
// DeviceId
// ========================================

/// Client-chosen device identifier, unique within its room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyDeviceId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DeviceId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ========================================
// DeviceType / DeviceStatus
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Producing side
    Camera,
    /// Consuming side, at most one per room
    Monitor,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Monitor => "monitor",
        }
    }
}

impl FromStr for DeviceType {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ValueObjectError::EmptyDeviceType),
            "camera" => Ok(Self::Camera),
            "monitor" => Ok(Self::Monitor),
            other => Err(ValueObjectError::UnknownDeviceType(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device status.
///
/// `Init -> Connected -> Ready -> Streaming (camera) | Receiving (monitor)`,
/// with `Error` reachable from anywhere. Informational only: no status
/// blocks event processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Init,
    Connected,
    Ready,
    Streaming,
    Receiving,
    Error,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Connected => "connected",
            Self::Ready => "ready",
            Self::Streaming => "streaming",
            Self::Receiving => "receiving",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================================
// Timestamp
// ========================================

/// Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_accepts_six_digits() {
        // テスト項目: 6 桁の数字は RoomId として受け付けられる
        // given (前提条件):
        let raw = "123456".to_string();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "123456");
    }

    #[test]
    fn test_room_id_rejects_malformed_values() {
        // テスト項目: 空文字・桁数違い・範囲外・数字以外は拒否される
        // given (前提条件):
        let cases = ["", "12345", "1234567", "012345", "12a456", "+12345"];

        for raw in cases {
            // when (操作):
            let result = RoomId::new(raw.to_string());

            // then (期待する結果):
            assert!(result.is_err(), "'{}' should be rejected", raw);
        }
        assert_eq!(
            RoomId::new(String::new()),
            Err(ValueObjectError::EmptyRoomId)
        );
    }

    #[test]
    fn test_room_id_factory_generates_valid_ids() {
        // テスト項目: 生成された RoomId は常に 6 桁かつ範囲内
        // given (前提条件):
        let attempts = 1000;

        for _ in 0..attempts {
            // when (操作):
            let id = RoomIdFactory::generate();

            // then (期待する結果):
            let n: u32 = id.as_str().parse().unwrap();
            assert_eq!(id.as_str().len(), 6);
            assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
            assert!((RoomId::MIN..=RoomId::MAX).contains(&n));
        }
    }

    #[test]
    fn test_device_id_rejects_empty() {
        // テスト項目: 空の DeviceId は作成できない
        // given (前提条件):
        let raw = String::new();

        // when (操作):
        let result = DeviceId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyDeviceId));
    }

    #[test]
    fn test_device_type_from_str() {
        // テスト項目: デバイス種別の文字列が正しく解釈される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!("camera".parse::<DeviceType>(), Ok(DeviceType::Camera));
        assert_eq!("monitor".parse::<DeviceType>(), Ok(DeviceType::Monitor));
        assert_eq!(
            "".parse::<DeviceType>(),
            Err(ValueObjectError::EmptyDeviceType)
        );
        assert_eq!(
            "speaker".parse::<DeviceType>(),
            Err(ValueObjectError::UnknownDeviceType("speaker".to_string()))
        );
    }

    #[test]
    fn test_device_status_serializes_lowercase() {
        // テスト項目: DeviceStatus は小文字の文字列としてシリアライズされる
        // given (前提条件):
        let status = DeviceStatus::Streaming;

        // when (操作):
        let json = serde_json::to_string(&status).unwrap();

        // then (期待する結果):
        assert_eq!(json, "\"streaming\"");
    }
}
