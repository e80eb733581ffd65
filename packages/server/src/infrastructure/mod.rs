//! Infrastructure layer
//!
//! ドメイン層が定義する抽象（`RoomRepository`, `ConnectionWriter`）の具体的な実装と、
//! HTTP API 向けの DTO を提供します。

pub mod connection;
pub mod dto;
pub mod repository;
