//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装（ルームレジストリ）。
//! `DashMap` をインメモリ DB として使用し、ルームごとにシャードされたロックで
//! 無関係なルーム同士が互いをブロックしないようにします。
//!
//! ## ロック順序
//!
//! `DashMap` のシャードロック → `Room` 内部のロック、の順でのみ取得します。
//! join はシャードロックを保持したまま `Room::add_device` を呼び、
//! leave は `remove_if` で「空であること」をシャードロック下で再確認してから削除します。
//! これにより、空になったルームの削除と同じルームへの join が競合しても、
//! join したデバイスが削除済みのルームに取り残されることはありません。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, mapref::entry::Entry};
use peerlink_shared::time::Clock;

use crate::domain::{
    Device, DeviceId, DeviceStatus, LeaveOutcome, Room, RoomId, RoomIdFactory, RoomRepository,
    SafeConnection, SignalingError, Timestamp,
};

/// Upper bound on room id generation attempts
const MAX_ID_ATTEMPTS: usize = 1000;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    rooms: DashMap<RoomId, Arc<Room>>,
    clock: Arc<dyn Clock>,
    generate_id: fn() -> RoomId,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_id_generator(clock, RoomIdFactory::generate)
    }

    /// Room ID の生成方法を差し替えて作成
    pub fn with_id_generator(clock: Arc<dyn Clock>, generate_id: fn() -> RoomId) -> Self {
        Self {
            rooms: DashMap::new(),
            clock,
            generate_id,
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    fn room(&self, room_id: &RoomId) -> Result<Arc<Room>, SignalingError> {
        self.rooms
            .get(room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SignalingError::RoomNotFound(room_id.as_str().to_string()))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, name: String) -> Result<Arc<Room>, SignalingError> {
        let now = self.now();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.generate_id)();
            if let Entry::Vacant(vacant) = self.rooms.entry(id.clone()) {
                let room = Arc::new(Room::new(id, name, now));
                vacant.insert(Arc::clone(&room));
                tracing::info!("Room '{}' created ({})", room.id(), room.name());
                return Ok(room);
            }
        }
        tracing::error!(
            "Failed to generate a free room id after {} attempts",
            MAX_ID_ATTEMPTS
        );
        Err(SignalingError::ExhaustedId)
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Arc<Room>, SignalingError> {
        self.room(room_id)
    }

    async fn list_rooms(&self) -> Vec<Arc<Room>> {
        self.rooms
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    async fn delete_room(&self, room_id: &RoomId) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!("Room '{}' deleted", room_id);
        }
    }

    async fn join_room(
        &self,
        room_id: &RoomId,
        mut device: Device,
        connection: Arc<SafeConnection>,
    ) -> Result<Device, SignalingError> {
        let now = self.now();
        device.room_id = room_id.clone();
        device.create_time = now;
        device.set_status(DeviceStatus::Connected, now);

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!("Room '{}' created implicitly by join", room_id);
            Arc::new(Room::new(room_id.clone(), format!("Room {}", room_id), now))
        });
        room.add_device(device.clone(), connection, now)?;
        drop(room);

        tracing::info!(
            "Device '{}' ({}) joined room '{}'",
            device.id,
            device.device_type,
            room_id
        );
        Ok(device)
    }

    async fn leave_room(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        connection: &Arc<SafeConnection>,
    ) -> LeaveOutcome {
        let Ok(room) = self.room(room_id) else {
            return LeaveOutcome::default();
        };

        let removed = room.remove_device(device_id, connection, self.now());
        if removed.is_none() {
            tracing::debug!(
                "Device '{}' is not registered with this connection in room '{}'",
                device_id,
                room_id
            );
            return LeaveOutcome::default();
        }
        tracing::info!("Device '{}' left room '{}'", device_id, room_id);

        // Only this exact room instance, and only if nobody joined meanwhile.
        let room_deleted = self
            .rooms
            .remove_if(room_id, |_, current| {
                Arc::ptr_eq(current, &room) && current.is_empty()
            })
            .is_some();
        if room_deleted {
            tracing::info!("Room '{}' deleted (empty)", room_id);
        }

        LeaveOutcome {
            removed,
            room_deleted,
        }
    }

    async fn update_device_status(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
        status: DeviceStatus,
    ) -> Result<Device, SignalingError> {
        let room = self.room(room_id)?;
        let device = room.update_device_status(device_id, status, self.now())?;
        tracing::debug!("Device '{}' status -> {}", device_id, status);
        Ok(device)
    }

    async fn get_device(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
    ) -> Result<Device, SignalingError> {
        self.room(room_id)?
            .device(device_id)
            .ok_or_else(|| SignalingError::DeviceNotFound(device_id.as_str().to_string()))
    }

    async fn get_devices(&self, room_id: &RoomId) -> Result<Vec<Device>, SignalingError> {
        Ok(self.room(room_id)?.devices())
    }

    async fn get_cameras(&self, room_id: &RoomId) -> Result<Vec<Device>, SignalingError> {
        Ok(self.room(room_id)?.cameras())
    }

    async fn get_monitor(&self, room_id: &RoomId) -> Result<Option<Device>, SignalingError> {
        Ok(self.room(room_id)?.monitor())
    }

    async fn get_connection(
        &self,
        room_id: &RoomId,
        device_id: &DeviceId,
    ) -> Result<Arc<SafeConnection>, SignalingError> {
        self.room(room_id)?
            .connection(device_id)
            .ok_or_else(|| SignalingError::DeviceNotFound(device_id.as_str().to_string()))
    }

    async fn get_connections(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<(DeviceId, Arc<SafeConnection>)>, SignalingError> {
        Ok(self.room(room_id)?.connections())
    }
}
