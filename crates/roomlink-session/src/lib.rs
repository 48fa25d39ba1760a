//! Client session management for roomlink.
//!
//! This crate keeps a chat client in a room:
//!
//! 1. **Joining**: validating the display name ([`validate_name`]) and
//!    announcing it to the server ([`JoinRequest`])
//! 2. **Staying connected**: one transport at a time, a single fixed-delay
//!    reconnect timer, and an automatic re-join ([`ConnectionManager`])
//! 3. **Room state**: the member list with the local user pinned first
//!    ([`RosterStore`]) and the message stream ([`SessionEvent`])
//!
//! # How it fits in the stack
//!
//! ```text
//! UI (above)  ← renders SessionEvents, calls SessionHandle
//!     ↕
//! Session Layer (this crate)  ← join flow, reconnection, roster
//!     ↕
//! Protocol Layer  ← Envelope, EnvelopeCodec
//!     ↕
//! Transport Layer (below)  ← Connector / Connection
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use roomlink_session::{SessionConfig, SessionController, SessionEvent};
//! use roomlink_transport::WebSocketConnector;
//!
//! # async fn example() -> Result<(), roomlink_session::SessionError> {
//! let (session, mut events, _task) =
//!     SessionController::spawn(SessionConfig::default(), WebSocketConnector::new());
//!
//! session.join("Alice", "3")?;
//! while let Some(event) = events.recv().await {
//!     if let SessionEvent::RosterChanged { online, .. } = event {
//!         println!("{online} online");
//!         session.send_text("hello")?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod controller;
mod error;
mod join;
mod roster;
mod state;

pub use config::{DEFAULT_ENDPOINT, DEFAULT_RECONNECT_DELAY, MAX_NAME_CHARS, SessionConfig};
pub use connection::{ConnectionEvent, ConnectionManager, DisconnectReason};
pub use controller::{
    CONNECTION_LOST_NOTICE, ONBOARDING_NOTICES, SessionController, SessionEvent, SessionHandle,
};
pub use error::{SessionError, ValidationError};
pub use join::{JoinRequest, validate_name};
pub use roster::RosterStore;
pub use state::{ConnectionState, SessionState, SessionStatus};
