//! Room aggregate.
//!
//! A room owns the devices currently joined and their connections. All
//! operations take the room's own lock for the duration of an in-memory
//! map access only; connections are handed out as `Arc`s so that writes
//! happen after the lock is released.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use super::{
    connection::SafeConnection,
    entity::Device,
    error::SignalingError,
    value_object::{DeviceId, DeviceStatus, RoomId, Timestamp},
};

struct DeviceConnection {
    device: Device,
    connection: Arc<SafeConnection>,
}

struct RoomState {
    update_time: Timestamp,
    devices: HashMap<DeviceId, DeviceConnection>,
}

pub struct Room {
    id: RoomId,
    name: String,
    create_time: Timestamp,
    state: Mutex<RoomState>,
}

impl Room {
    pub fn new(id: RoomId, name: String, now: Timestamp) -> Self {
        Self {
            id,
            name,
            create_time: now,
            state: Mutex::new(RoomState {
                update_time: now,
                devices: HashMap::new(),
            }),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_time(&self) -> Timestamp {
        self.create_time
    }

    pub fn update_time(&self) -> Timestamp {
        self.state.lock().update_time
    }

    /// Insert or overwrite a device entry.
    ///
    /// The monitor check and the insert happen under one lock, so of two
    /// racing monitor joins exactly one wins. On `MonitorAlreadyPresent`
    /// nothing is modified.
    pub fn add_device(
        &self,
        device: Device,
        connection: Arc<SafeConnection>,
        now: Timestamp,
    ) -> Result<(), SignalingError> {
        let mut state = self.state.lock();
        if device.is_monitor() && state.devices.values().any(|dc| dc.device.is_monitor()) {
            return Err(SignalingError::MonitorAlreadyPresent(
                self.id.as_str().to_string(),
            ));
        }
        state.devices.insert(
            device.id.clone(),
            DeviceConnection { device, connection },
        );
        state.update_time = now;
        Ok(())
    }

    /// Remove a device if present and still owned by `connection`.
    ///
    /// An entry that was overwritten by a later join with the same id belongs
    /// to the newer connection and is left alone. Idempotent.
    pub fn remove_device(
        &self,
        device_id: &DeviceId,
        connection: &Arc<SafeConnection>,
        now: Timestamp,
    ) -> Option<Device> {
        let mut state = self.state.lock();
        let owned = state
            .devices
            .get(device_id)
            .is_some_and(|dc| Arc::ptr_eq(&dc.connection, connection));
        if !owned {
            return None;
        }
        let removed = state.devices.remove(device_id).map(|dc| dc.device);
        state.update_time = now;
        removed
    }

    pub fn device(&self, device_id: &DeviceId) -> Option<Device> {
        self.state
            .lock()
            .devices
            .get(device_id)
            .map(|dc| dc.device.clone())
    }

    pub fn connection(&self, device_id: &DeviceId) -> Option<Arc<SafeConnection>> {
        self.state
            .lock()
            .devices
            .get(device_id)
            .map(|dc| dc.connection.clone())
    }

    /// Snapshot of every device in the room.
    pub fn devices(&self) -> Vec<Device> {
        self.state
            .lock()
            .devices
            .values()
            .map(|dc| dc.device.clone())
            .collect()
    }

    /// Snapshot of every connection in the room, keyed by device.
    pub fn connections(&self) -> Vec<(DeviceId, Arc<SafeConnection>)> {
        self.state
            .lock()
            .devices
            .iter()
            .map(|(id, dc)| (id.clone(), dc.connection.clone()))
            .collect()
    }

    pub fn cameras(&self) -> Vec<Device> {
        self.state
            .lock()
            .devices
            .values()
            .filter(|dc| dc.device.is_camera())
            .map(|dc| dc.device.clone())
            .collect()
    }

    pub fn monitor(&self) -> Option<Device> {
        self.state
            .lock()
            .devices
            .values()
            .find(|dc| dc.device.is_monitor())
            .map(|dc| dc.device.clone())
    }

    pub fn has_monitor(&self) -> bool {
        self.state
            .lock()
            .devices
            .values()
            .any(|dc| dc.device.is_monitor())
    }

    /// Set a device's status and return the updated record.
    pub fn update_device_status(
        &self,
        device_id: &DeviceId,
        status: DeviceStatus,
        now: Timestamp,
    ) -> Result<Device, SignalingError> {
        let mut state = self.state.lock();
        let entry = state
            .devices
            .get_mut(device_id)
            .ok_or_else(|| SignalingError::DeviceNotFound(device_id.as_str().to_string()))?;
        entry.device.set_status(status, now);
        Ok(entry.device.clone())
    }

    pub fn device_count(&self) -> usize {
        self.state.lock().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().devices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::value_object::DeviceType, test_support::channel_connection};

    fn room() -> Room {
        Room::new(
            RoomId::new("123456".to_string()).unwrap(),
            "Room 123456".to_string(),
            Timestamp::new(1000),
        )
    }

    fn device(id: &str, device_type: DeviceType) -> Device {
        Device::new(
            DeviceId::new(id.to_string()).unwrap(),
            device_type,
            RoomId::new("123456".to_string()).unwrap(),
            id.to_string(),
            Timestamp::new(1000),
        )
    }

    fn id(raw: &str) -> DeviceId {
        DeviceId::new(raw.to_string()).unwrap()
    }

    #[test]
    fn test_add_device_bumps_update_time() {
        // テスト項目: デバイス追加でルームの updateTime が更新される
        // given (前提条件):
        let room = room();
        let (connection, _rx) = channel_connection();

        // when (操作):
        room.add_device(device("cam", DeviceType::Camera), connection, Timestamp::new(2000))
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.device_count(), 1);
        assert_eq!(room.create_time(), Timestamp::new(1000));
        assert_eq!(room.update_time(), Timestamp::new(2000));
    }

    #[test]
    fn test_second_monitor_is_rejected_without_mutation() {
        // テスト項目: 2 台目の Monitor は拒否され、ルームの状態は変わらない
        // given (前提条件):
        let room = room();
        let (c1, _rx1) = channel_connection();
        let (c2, _rx2) = channel_connection();
        room.add_device(device("mon-1", DeviceType::Monitor), c1, Timestamp::new(2000))
            .unwrap();

        // when (操作):
        let result = room.add_device(
            device("mon-2", DeviceType::Monitor),
            c2,
            Timestamp::new(3000),
        );

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SignalingError::MonitorAlreadyPresent("123456".to_string()))
        );
        assert_eq!(room.device_count(), 1);
        assert_eq!(room.update_time(), Timestamp::new(2000));
        assert_eq!(room.monitor().unwrap().id, id("mon-1"));
    }

    #[test]
    fn test_colliding_device_id_overwrites_entry() {
        // テスト項目: 同じ ID のデバイスは上書きされる
        // given (前提条件):
        let room = room();
        let (c1, _rx1) = channel_connection();
        let (c2, _rx2) = channel_connection();
        room.add_device(device("cam", DeviceType::Camera), c1, Timestamp::new(2000))
            .unwrap();

        // when (操作):
        let mut replacement = device("cam", DeviceType::Camera);
        replacement.name = "replacement".to_string();
        room.add_device(replacement, c2.clone(), Timestamp::new(3000))
            .unwrap();

        // then (期待する結果):
        assert_eq!(room.device_count(), 1);
        assert_eq!(room.device(&id("cam")).unwrap().name, "replacement");
        assert!(Arc::ptr_eq(&room.connection(&id("cam")).unwrap(), &c2));
    }

    #[test]
    fn test_remove_device_is_idempotent() {
        // テスト項目: 存在しないデバイスの削除は何もしない（冪等性）
        // given (前提条件):
        let room = room();
        let (connection, _rx) = channel_connection();
        room.add_device(
            device("cam", DeviceType::Camera),
            connection.clone(),
            Timestamp::new(2000),
        )
        .unwrap();

        // when (操作):
        let first = room.remove_device(&id("cam"), &connection, Timestamp::new(3000));
        let second = room.remove_device(&id("cam"), &connection, Timestamp::new(4000));

        // then (期待する結果):
        assert_eq!(first.unwrap().id, id("cam"));
        assert!(second.is_none());
        assert!(room.is_empty());
    }

    #[test]
    fn test_remove_device_ignores_stale_connection() {
        // テスト項目: 同じ ID で上書きされた後、古い接続からの削除は新しいエントリを消さない
        // given (前提条件):
        let room = room();
        let (old, _rx1) = channel_connection();
        let (new, _rx2) = channel_connection();
        room.add_device(device("cam", DeviceType::Camera), old.clone(), Timestamp::new(2000))
            .unwrap();
        room.add_device(device("cam", DeviceType::Camera), new.clone(), Timestamp::new(3000))
            .unwrap();

        // when (操作):
        let stale = room.remove_device(&id("cam"), &old, Timestamp::new(4000));

        // then (期待する結果):
        assert!(stale.is_none());
        assert_eq!(room.device_count(), 1);
        assert!(Arc::ptr_eq(&room.connection(&id("cam")).unwrap(), &new));
        assert_eq!(room.update_time(), Timestamp::new(3000));
    }

    #[test]
    fn test_listing_filters_by_type() {
        // テスト項目: cameras / monitor / has_monitor が種別で絞り込まれる
        // given (前提条件):
        let room = room();
        for (name, device_type) in [
            ("cam-1", DeviceType::Camera),
            ("cam-2", DeviceType::Camera),
            ("mon", DeviceType::Monitor),
        ] {
            let (connection, _rx) = channel_connection();
            room.add_device(device(name, device_type), connection, Timestamp::new(2000))
                .unwrap();
        }

        // when (操作):
        let mut cameras: Vec<String> = room
            .cameras()
            .into_iter()
            .map(|d| d.id.into_string())
            .collect();
        cameras.sort();

        // then (期待する結果):
        assert_eq!(cameras, vec!["cam-1", "cam-2"]);
        assert_eq!(room.monitor().unwrap().id, id("mon"));
        assert!(room.has_monitor());
        assert_eq!(room.devices().len(), 3);
        assert_eq!(room.connections().len(), 3);
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_mutation() {
        // テスト項目: 取得済みのスナップショットは後の変更を反映しない
        // given (前提条件):
        let room = room();
        let (connection, _rx) = channel_connection();
        room.add_device(
            device("cam", DeviceType::Camera),
            connection.clone(),
            Timestamp::new(2000),
        )
        .unwrap();
        let snapshot = room.devices();

        // when (操作):
        room.update_device_status(&id("cam"), DeviceStatus::Ready, Timestamp::new(3000))
            .unwrap();
        room.remove_device(&id("cam"), &connection, Timestamp::new(4000));

        // then (期待する結果):
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, DeviceStatus::Init);
    }

    #[test]
    fn test_update_status_of_missing_device_fails() {
        // テスト項目: 存在しないデバイスのステータス更新は DeviceNotFound
        // given (前提条件):
        let room = room();

        // when (操作):
        let result = room.update_device_status(&id("ghost"), DeviceStatus::Ready, Timestamp::new(1));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(SignalingError::DeviceNotFound("ghost".to_string()))
        );
    }

    #[test]
    fn test_concurrent_monitor_joins_admit_exactly_one() {
        // テスト項目: 同時に複数の Monitor が参加しても成功するのは 1 台だけ
        // given (前提条件):
        let room = Arc::new(room());

        // when (操作): 8 スレッドが同時に Monitor として参加
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let room = room.clone();
                std::thread::spawn(move || {
                    let (connection, _rx) = channel_connection();
                    room.add_device(
                        device(&format!("mon-{}", i), DeviceType::Monitor),
                        connection,
                        Timestamp::new(2000),
                    )
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // then (期待する結果):
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().filter(|r| r.is_err()).all(|r| matches!(
            r,
            Err(SignalingError::MonitorAlreadyPresent(_))
        )));
        assert_eq!(room.devices().iter().filter(|d| d.is_monitor()).count(), 1);
    }
}
