//! Error types for the protocol layer.
//!
//! Each roomlink crate defines its own error enum. A `ProtocolError` always
//! means a frame could not be turned into (or out of) an [`Envelope`].
//!
//! [`Envelope`]: crate::Envelope

/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an envelope into a text frame).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame is not a JSON object, or a known kind is missing a
    /// required field or carries a field of the wrong type.
    #[error("malformed envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The frame is a JSON object without a string `type` field.
    #[error("envelope has no type discriminator")]
    MissingKind,

    /// The `type` field names a kind this client does not know.
    ///
    /// There is no version negotiation, so newer servers may send kinds we
    /// have never seen. Callers drop these frames.
    #[error("unknown envelope kind: {0}")]
    UnknownKind(String),
}

impl ProtocolError {
    /// Returns `true` for an unrecognized kind, as opposed to a broken frame.
    pub fn is_unknown_kind(&self) -> bool {
        matches!(self, Self::UnknownKind(_))
    }
}
