//! Outbound side of a device connection.
//!
//! The transport's write half is wrapped in a [`SafeConnection`] as soon as
//! the connection is accepted and is never exposed anywhere else. Every
//! delivery (the device's own replies as well as events forwarded or
//! broadcast from other devices) goes through [`SafeConnection::write`],
//! whose lock keeps frames from interleaving.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::SignalingError;

/// Write half of a duplex message connection.
///
/// Implemented by the WebSocket sink in the infrastructure layer and by
/// in-memory writers in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionWriter: Send {
    /// Write one complete text message.
    async fn write_text(&mut self, text: String) -> Result<(), SignalingError>;

    /// Close the underlying connection.
    async fn close(&mut self) -> Result<(), SignalingError>;
}

/// A connection whose writes are serialized by a per-connection lock.
///
/// Racing writers observe some total order; nothing more is promised.
pub struct SafeConnection {
    writer: Mutex<Box<dyn ConnectionWriter>>,
}

impl SafeConnection {
    pub fn new<W>(writer: W) -> Self
    where
        W: ConnectionWriter + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Write one message while holding this connection's lock.
    pub async fn write(&self, text: String) -> Result<(), SignalingError> {
        let mut writer = self.writer.lock().await;
        writer.write_text(text).await
    }

    pub async fn close(&self) -> Result<(), SignalingError> {
        let mut writer = self.writer.lock().await;
        writer.close().await
    }
}

impl fmt::Debug for SafeConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeConnection").finish_non_exhaustive()
    }
}
