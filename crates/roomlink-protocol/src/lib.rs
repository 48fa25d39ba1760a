//! Wire protocol for roomlink.
//!
//! This crate defines the "language" the chat client and server speak:
//!
//! - **Types** ([`Envelope`], [`User`], [`ChatMessage`], ...): the records
//!   that travel on the wire, one envelope per text frame.
//! - **Codec** ([`EnvelopeCodec`]): JSON text ↔ [`Envelope`], with unknown
//!   kinds reported separately from broken frames.
//! - **Avatars** ([`avatar_url`]): the fixed avatar catalog used at join.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (text frames) and session
//! (room state). It knows nothing about connections or retries.
//!
//! ```text
//! Transport (frames) → Protocol (Envelope) → Session (roster, events)
//! ```

mod avatar;
mod codec;
mod error;
mod types;

pub use avatar::{DEFAULT_AVATAR_ID, avatar_ids, avatar_url, default_avatar_url};
pub use codec::EnvelopeCodec;
pub use error::ProtocolError;
pub use types::{
    ChatMessage, Envelope, MessageType, Timestamp, User, UserEntry,
    UserId,
};
