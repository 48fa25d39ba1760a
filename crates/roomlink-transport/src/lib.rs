//! Client transport abstraction layer for roomlink.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! the way a chat client reaches its server. A connection is text-framed:
//! one frame carries one protocol envelope.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client transport via `tokio-tungstenite`
//! - `memory`: in-process transport backed by channels, for tests and demos

mod error;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Close status reported when the remote side ends the connection.
///
/// Codes follow RFC 6455: 1000 is a normal close, 1005 means the peer sent
/// a close frame without a status, and 1006 means the stream ended without
/// any close frame at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// The close status code.
    pub code: u16,
    /// The human-readable reason, possibly empty.
    pub reason: String,
}

impl CloseInfo {
    /// Normal closure.
    pub const NORMAL: u16 = 1000;
    /// A close frame arrived without a status code.
    pub const NO_STATUS: u16 = 1005;
    /// The connection dropped without a close handshake.
    pub const ABNORMAL: u16 = 1006;

    /// Creates a close status with the given code and reason.
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// The status used when the stream ended without a close frame.
    pub fn abnormal() -> Self {
        Self::new(Self::ABNORMAL, "")
    }
}

impl fmt::Display for CloseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "code {}", self.code)
        } else {
            write!(f, "code {} ({})", self.code, self.reason)
        }
    }
}

/// What a single [`Connection::recv`] call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// One text frame from the server.
    Frame(String),
    /// The connection is closed. No further frames will arrive.
    Closed(CloseInfo),
}

/// Opens outbound connections to a chat server.
///
/// The futures are required to be `Send` so that connecting and reading can
/// run on a spawned Tokio task. Implementations may still be written with
/// `async fn`.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens a new connection to `endpoint`.
    fn connect(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// A single open connection that exchanges text frames.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame to the server.
    fn send_text(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next frame from the server.
    ///
    /// Returns [`Incoming::Closed`] once the connection has ended. Sending
    /// and receiving may happen concurrently from different tasks.
    fn recv(&self) -> impl Future<Output = Result<Incoming, TransportError>> + Send;

    /// Closes the connection.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
