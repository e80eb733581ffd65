//! UseCase layer
//!
//! ドメイン層の抽象（`RoomRepository`, `SafeConnection`）だけに依存し、
//! シグナリングの手順（接続・イベント処理・切断）と HTTP API 向けの操作を提供します。

pub mod connect_device;
pub mod create_room;
pub mod disconnect_device;
pub mod event_router;
pub mod get_room_detail;
pub mod get_room_devices;
pub mod get_rooms;
pub mod receive_event;

pub use connect_device::{ConnectDeviceUseCase, JoinRequest};
pub use create_room::CreateRoomUseCase;
pub use disconnect_device::DisconnectDeviceUseCase;
pub use event_router::EventRouter;
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_room_devices::GetRoomDevicesUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use receive_event::ReceiveEventUseCase;
