//! Peerlink signaling relay library.
//!
//! Cameras and monitors join a shared room over WebSocket and exchange
//! WebRTC negotiation events (ready / offer / answer / ICE candidate)
//! through this server. The server tracks room membership, drives each
//! device's status, and routes events; it never touches media.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

#[cfg(test)]
pub(crate) mod test_support;
