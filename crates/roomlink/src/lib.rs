//! # Roomlink
//!
//! Client core for a single realtime chat room.
//!
//! Roomlink joins a room under a display name and avatar, keeps the
//! connection alive with a fixed-delay reconnect, tracks the member list,
//! and turns the server's JSON envelopes into [`SessionEvent`]s a UI can
//! render. Rendering itself is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roomlink::prelude::*;
//!
//! # async fn run() -> Result<(), RoomlinkError> {
//! roomlink::logging::init();
//!
//! let config = SessionConfig::default().with_endpoint("ws://127.0.0.1:8080/");
//! let (session, mut events, _task) =
//!     SessionController::spawn(config, WebSocketConnector::new());
//! session.join("Alice", "3")?;
//!
//! let photo = roomlink::media::load_attachment("cat.png").await?;
//! session.send_message(photo.message_type, photo.content)?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;
pub mod media;

pub use error::{MediaError, RoomlinkError};
pub use roomlink_protocol as protocol;
pub use roomlink_session as session;
pub use roomlink_transport as transport;

pub use roomlink_protocol::{ChatMessage, Envelope, MessageType, User, UserId};
pub use roomlink_session::{
    SessionConfig, SessionController, SessionEvent, SessionHandle, SessionStatus,
};

/// The types most clients need.
pub mod prelude {
    pub use crate::error::RoomlinkError;
    pub use crate::media::Attachment;
    pub use roomlink_protocol::{ChatMessage, MessageType, User, avatar_ids};
    pub use roomlink_session::{
        ConnectionState, SessionConfig, SessionController, SessionEvent, SessionHandle,
        SessionState, SessionStatus, ValidationError,
    };
    pub use roomlink_transport::WebSocketConnector;
}
