//! Unified error type for roomlink.

use roomlink_protocol::ProtocolError;
use roomlink_session::SessionError;
use roomlink_transport::TransportError;

/// Failure to turn a local file into an attachment.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The file could not be read.
    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension is not a known image or video type.
    #[error("unsupported attachment type: {0}")]
    UnsupportedType(String),
}

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `roomlink` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]` attribute
/// on each variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum RoomlinkError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (bad name, session closed).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// An attachment could not be prepared.
    #[error(transparent)]
    Media(#[from] MediaError),
}
