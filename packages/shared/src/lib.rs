//! Utilities shared between the Peerlink binaries and their tests.

pub mod logger;
pub mod time;
