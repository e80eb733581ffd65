//! Repository trait 定義
//!
//! ルームレジストリへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    connection::SafeConnection,
    entity::Device,
    error::SignalingError,
    room::Room,
    value_object::{DeviceId, DeviceStatus, RoomId},
};

/// Result of [`RoomRepository::leave_room`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaveOutcome {
    /// The device record that was removed, if it was still registered
    pub removed: Option<Device>,
    /// Whether the room was deleted because it became empty
    pub room_deleted: bool,
}

/// Room registry.
///
/// Every method is safe to call concurrently. Read methods return
/// snapshots; later mutations do not affect them.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room under a freshly generated, unused id.
    async fn create_room(&self, name: String) -> Result<Arc<Room>, SignalingError>;

    async fn get_room(&self, room_id: &RoomId) -> Result<Arc<Room>, SignalingError>;

    async fn list_rooms(&self) -> Vec<Arc<Room>>;

    /// Remove a room unconditionally. No-op if absent.
    async fn delete_room(&self, room_id: &RoomId);

    /// Register a device in a room, creating the room implicitly.
    ///
    /// On success the stored device is `Connected` with create/update time
    /// set to now, and is returned.
    async fn join_room(
        &self,
        room_id: &RoomId,
        device: Device,
        connection: Arc<SafeConnection>,
    ) -> Result<Device, SignalingError>;

    /// Unregister a device. Never fails; the room is deleted when it
    /// becomes empty.
    ///
    /// Only the entry registered with `connection` is removed; a teardown of
    /// a connection whose device id was taken over by a later join is a no-op.
    async fn leave_room(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        connection: &Arc<SafeConnection>,
    ) -> LeaveOutcome;

    async fn update_device_status(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        status: DeviceStatus,
    ) -> Result<Device, SignalingError>;

    async fn get_device(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
    ) -> Result<Device, SignalingError>;

    async fn get_devices(&self, room_id: &RoomId) -> Result<Vec<Device>, SignalingError>;

    async fn get_cameras(&self, room_id: &RoomId) -> Result<Vec<Device>, SignalingError>;

    /// `Ok(None)` when the room exists but has no monitor.
    async fn get_monitor(&self, room_id: &RoomId) -> Result<Option<Device>, SignalingError>;

    async fn get_connection(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
    ) -> Result<Arc<SafeConnection>, SignalingError>;

    async fn get_connections(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<(DeviceId, Arc<SafeConnection>)>, SignalingError>;
}
