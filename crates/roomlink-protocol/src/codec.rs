//! The envelope codec: text frames in, [`Envelope`]s out, and back.
//!
//! Decoding happens in two steps. The frame is first parsed as a generic
//! JSON value so the `type` discriminator can be inspected on its own; only
//! then is it converted into the typed [`Envelope`]. That split is what
//! lets callers tell an unknown kind (a newer server, harmless) apart from
//! a broken frame of a kind we do know.

use serde_json::Value;

use crate::{Envelope, ProtocolError};

/// Encodes and decodes [`Envelope`]s as JSON text frames.
///
/// Stateless and `Copy`, so every owner can keep its own.
///
/// ## Example
///
/// ```rust
/// use roomlink_protocol::{Envelope, EnvelopeCodec};
///
/// let codec = EnvelopeCodec;
/// let join = Envelope::Join { name: "Alice".into(), avatar: "a.jpg".into() };
///
/// let frame = codec.encode(&join).unwrap();
/// assert_eq!(codec.decode(&frame).unwrap(), join);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    /// Serializes an envelope into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    pub fn encode(&self, envelope: &Envelope) -> Result<String, ProtocolError> {
        serde_json::to_string(envelope).map_err(ProtocolError::Encode)
    }

    /// Parses one text frame into an envelope.
    ///
    /// # Errors
    /// - [`ProtocolError::Malformed`]: not JSON, or a known kind with
    ///   missing or mistyped fields
    /// - [`ProtocolError::MissingKind`]: no string `type` field
    /// - [`ProtocolError::UnknownKind`]: a `type` we don't recognize
    pub fn decode(&self, raw: &str) -> Result<Envelope, ProtocolError> {
        let value: Value =
            serde_json::from_str(raw).map_err(ProtocolError::Malformed)?;

        match value.get("type").and_then(Value::as_str) {
            None => return Err(ProtocolError::MissingKind),
            Some(kind) if !Envelope::KINDS.contains(&kind) => {
                return Err(ProtocolError::UnknownKind(kind.to_owned()));
            }
            Some(_) => {}
        }

        serde_json::from_value(value).map_err(ProtocolError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Timestamp, UserEntry};

    #[test]
    fn test_decode_garbage_is_malformed() {
        let err = EnvelopeCodec.decode("not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn test_decode_without_type_is_missing_kind() {
        let err = EnvelopeCodec.decode(r#"{"message": "hi"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingKind));

        let err = EnvelopeCodec.decode(r#"{"type": 7}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingKind));

        let err = EnvelopeCodec.decode("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ProtocolError::MissingKind));
    }

    #[test]
    fn test_decode_unknown_kind_names_it() {
        let err = EnvelopeCodec
            .decode(r#"{"type": "typing", "user": 1}"#)
            .unwrap_err();
        assert!(err.is_unknown_kind());
        assert_eq!(err.to_string(), "unknown envelope kind: typing");
    }

    #[test]
    fn test_decode_known_kind_missing_field_is_malformed() {
        // `user_left` requires both `user` and `users`.
        let err = EnvelopeCodec
            .decode(r#"{"type": "user_left", "users": []}"#)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
        assert!(!err.is_unknown_kind());
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let env = EnvelopeCodec
            .decode(r#"{"type": "system_message", "message": "hi", "level": "info"}"#)
            .unwrap();
        assert_eq!(
            env,
            Envelope::SystemMessage {
                message: "hi".into()
            }
        );
    }

    #[test]
    fn test_decode_user_joined_with_negative_and_fractional_ids() {
        for id in ["-5", "0.123"] {
            let raw = format!(
                r#"{{"type": "user_joined", "user": {{"id": {id}, "name": "Alice"}}, "users": [{{"id": {id}, "name": "Alice"}}]}}"#
            );
            let Envelope::UserJoined { user, users } = EnvelopeCodec.decode(&raw).unwrap() else {
                panic!("expected user_joined");
            };
            assert_eq!(user.id.to_string(), id);
            assert_eq!(users[0].id.as_ref(), Some(&user.id));

            let reencoded = EnvelopeCodec
                .encode(&Envelope::UserJoined { user, users })
                .unwrap();
            assert!(reencoded.contains(&format!(r#""id":{id}"#)));
        }
    }

    #[test]
    fn test_decode_new_message_with_fractional_timestamp() {
        let raw = r#"{
            "type": "new_message",
            "user": {"id": 2, "name": "Bob"},
            "message": {"messageType": "text", "content": "hi", "timestamp": 1700000000000.5}
        }"#;
        let Envelope::NewMessage { message, .. } = EnvelopeCodec.decode(raw).unwrap() else {
            panic!("expected new_message");
        };
        assert_eq!(message.content, "hi");
        assert!(matches!(message.timestamp, Timestamp::OtherNumber(_)));
    }

    #[test]
    fn test_decode_roster_with_null_entry_keeps_envelope() {
        let env = EnvelopeCodec
            .decode(r#"{"type": "user_list", "users": [{"id": 1, "name": "A"}, null]}"#)
            .unwrap();
        let Envelope::UserList { users } = env else {
            panic!("expected user_list");
        };
        assert_eq!(users.len(), 2);
        assert_eq!(users[1], UserEntry::default());
    }
}
