//! Server state.

use std::sync::Arc;

use peerlink_shared::time::Clock;

use crate::{
    domain::RoomRepository,
    usecase::{
        ConnectDeviceUseCase, CreateRoomUseCase, DisconnectDeviceUseCase, EventRouter,
        GetRoomDetailUseCase, GetRoomDevicesUseCase, GetRoomsUseCase, ReceiveEventUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectDeviceUseCase（デバイス接続のユースケース）
    pub connect_device_usecase: Arc<ConnectDeviceUseCase>,
    /// ReceiveEventUseCase（受信メッセージ処理のユースケース）
    pub receive_event_usecase: Arc<ReceiveEventUseCase>,
    /// DisconnectDeviceUseCase（デバイス切断のユースケース）
    pub disconnect_device_usecase: Arc<DisconnectDeviceUseCase>,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// GetRoomDevicesUseCase（ルーム内デバイス一覧取得のユースケース）
    pub get_room_devices_usecase: Arc<GetRoomDevicesUseCase>,
}

impl AppState {
    /// Wire every use case on top of one repository and clock.
    pub fn new(repository: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        let router = Arc::new(EventRouter::new(repository.clone()));
        Self {
            connect_device_usecase: Arc::new(ConnectDeviceUseCase::new(
                repository.clone(),
                router.clone(),
                clock.clone(),
            )),
            receive_event_usecase: Arc::new(ReceiveEventUseCase::new(
                router.clone(),
                clock.clone(),
            )),
            disconnect_device_usecase: Arc::new(DisconnectDeviceUseCase::new(
                repository.clone(),
                router,
                clock,
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(repository.clone())),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository.clone())),
            get_room_devices_usecase: Arc::new(GetRoomDevicesUseCase::new(repository)),
        }
    }
}
