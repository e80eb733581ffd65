//! Domain error types.

use thiserror::Error;

/// Validation errors raised while constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id '{0}' must be six digits between 100000 and 999999")]
    InvalidRoomId(String),

    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("device type must not be empty")]
    EmptyDeviceType,

    #[error("unknown device type '{0}'")]
    UnknownDeviceType(String),
}

/// Errors surfaced by the signaling core.
///
/// The `Display` text is sent back to the offending device inside an
/// `error` event, so keep messages short and client-readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalingError {
    /// Malformed join parameters, rejected before any state mutation
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("device '{0}' not found")]
    DeviceNotFound(String),

    /// A second monitor tried to join a room
    #[error("room '{0}' already has a monitor")]
    MonitorAlreadyPresent(String),

    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    /// Inbound event (envelope or payload) could not be decoded
    #[error("invalid event format: {0}")]
    DecodeFailure(String),

    /// Writing to the target connection failed
    #[error("failed to deliver event: {0}")]
    DeliveryFailure(String),

    /// Every candidate room id is taken
    #[error("no free room id available")]
    ExhaustedId,
}

impl From<ValueObjectError> for SignalingError {
    fn from(err: ValueObjectError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_object_error_maps_to_invalid_request() {
        // テスト項目: 値オブジェクトの検証エラーは InvalidRequest に変換される
        // given (前提条件):
        let err = ValueObjectError::EmptyDeviceId;

        // when (操作):
        let signaling: SignalingError = err.into();

        // then (期待する結果):
        assert_eq!(
            signaling,
            SignalingError::InvalidRequest("device id must not be empty".to_string())
        );
    }

    #[test]
    fn test_error_message_is_client_readable() {
        // テスト項目: error イベントに載るメッセージが原因を含む
        // given (前提条件):
        let err = SignalingError::MonitorAlreadyPresent("123456".to_string());

        // when (操作):
        let message = err.to_string();

        // then (期待する結果):
        assert_eq!(message, "room '123456' already has a monitor");
    }
}
