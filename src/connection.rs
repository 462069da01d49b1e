//! Send handles for the two sides of a session.
//!
//! Transport framing, compression, and encryption live in the platform
//! codecs; this layer deals in typed packet values. Each handle wraps an
//! unbounded channel drained by the codec's writer task, so sending never
//! blocks a translator.

use crate::{
    config::Credentials,
    protocol::{bedrock, java},
};
use futures::future::BoxFuture;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection closed")]
    Closed,
}

/// Send half of the frontend (client-facing) connection.
#[derive(Clone)]
pub struct UpstreamConnection {
    sender: flume::Sender<bedrock::Packet>,
    closed: Arc<AtomicBool>,
}

impl UpstreamConnection {
    /// Creates a connection and the receiver its writer task drains.
    pub fn channel() -> (Self, flume::Receiver<bedrock::Packet>) {
        let (sender, receiver) = flume::unbounded();
        (
            Self {
                sender,
                closed: Arc::new(AtomicBool::new(false)),
            },
            receiver,
        )
    }

    pub fn send_packet(&self, packet: bedrock::Packet) -> Result<(), ConnectionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::Closed);
        }
        self.sender.send(packet).map_err(|_| ConnectionError::Closed)
    }

    /// Sends the disconnect screen and marks the handle closed. Safe to
    /// call more than once.
    pub fn disconnect(&self, kick_message: impl Into<String>) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.sender.send(bedrock::Packet::Disconnect(bedrock::Disconnect {
            hide_screen: false,
            kick_message: kick_message.into(),
        }));
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_disconnected()
    }
}

/// Send half of the backend (server-facing) connection.
#[derive(Clone)]
pub struct DownstreamConnection {
    sender: flume::Sender<java::ClientPacket>,
    closed: Arc<AtomicBool>,
}

impl DownstreamConnection {
    pub fn channel() -> (Self, flume::Receiver<java::ClientPacket>) {
        let (sender, receiver) = flume::unbounded();
        (
            Self {
                sender,
                closed: Arc::new(AtomicBool::new(false)),
            },
            receiver,
        )
    }

    pub fn send_packet(&self, packet: java::ClientPacket) -> Result<(), ConnectionError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::Closed);
        }
        self.sender.send(packet).map_err(|_| ConnectionError::Closed)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.sender.is_disconnected()
    }
}

/// Opens backend connections. The standalone proxy dials TCP; embedded
/// platforms splice directly into the host server, and tests use an
/// in-memory channel.
///
/// `credentials` is populated in online mode so the implementation can
/// run the backend's native identity check; otherwise `None`.
pub trait RemoteServer: Send + Sync {
    fn open(
        &self,
        handshake: java::Handshake,
        credentials: Option<Credentials>,
    ) -> BoxFuture<'static, anyhow::Result<DownstreamConnection>>;
}
