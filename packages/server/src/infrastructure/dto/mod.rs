//! Data Transfer Objects (DTOs) for the HTTP API.
//!
//! WebSocket events are modelled in the domain layer (`domain::event`)
//! because their shape is part of the routing protocol itself.

pub mod conversion;
pub mod http;
