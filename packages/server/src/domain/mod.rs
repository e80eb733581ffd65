//! Domain layer
//!
//! ルーム・デバイス・イベントのドメインモデルと、
//! UseCase 層が依存する抽象（`RoomRepository`, `ConnectionWriter`）を定義します。

pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod repository;
pub mod room;
pub mod value_object;

pub use connection::{ConnectionWriter, SafeConnection};
pub use entity::Device;
pub use error::{SignalingError, ValueObjectError};
pub use event::{
    ConnectPayload, ErrorPayload, Event, EventType, IceCandidatePayload, JoinRoomPayload,
    LeaveRoomPayload, ReadyPayload, SessionDescriptionPayload, Signal,
};
pub use repository::{LeaveOutcome, RoomRepository};
pub use room::Room;
pub use value_object::{DeviceId, DeviceStatus, DeviceType, RoomId, RoomIdFactory, Timestamp};
