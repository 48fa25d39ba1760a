//! Image and video attachments.
//!
//! Attachments travel inline: the message content is a `data:` URI holding
//! the whole file, base64-encoded. Receivers can render it without a second
//! fetch, at the cost of a frame roughly a third larger than the file.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use roomlink_protocol::MessageType;
use tracing::debug;

use crate::error::MediaError;

/// Extensions we know how to send, with their MIME type and message type.
const KNOWN_TYPES: [(&str, &str, MessageType); 11] = [
    ("png", "image/png", MessageType::Image),
    ("jpg", "image/jpeg", MessageType::Image),
    ("jpeg", "image/jpeg", MessageType::Image),
    ("gif", "image/gif", MessageType::Image),
    ("webp", "image/webp", MessageType::Image),
    ("svg", "image/svg+xml", MessageType::Image),
    ("mp4", "video/mp4", MessageType::Video),
    ("webm", "video/webm", MessageType::Video),
    ("ogv", "video/ogg", MessageType::Video),
    ("ogg", "video/ogg", MessageType::Video),
    ("mov", "video/quicktime", MessageType::Video),
];

/// A file ready to go out as a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// [`MessageType::Image`] or [`MessageType::Video`].
    pub message_type: MessageType,
    /// The file as a `data:` URI.
    pub content: String,
}

/// Encodes `bytes` as a base64 `data:` URI.
///
/// ```rust
/// assert_eq!(
///     roomlink::media::data_uri("image/png", b"hi"),
///     "data:image/png;base64,aGk="
/// );
/// ```
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Looks up the MIME type and message type for a file name by extension.
///
/// Matching ignores ASCII case.
pub fn classify(path: &Path) -> Option<(&'static str, MessageType)> {
    let ext = path.extension()?.to_str()?;
    KNOWN_TYPES
        .iter()
        .find(|(known, _, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, mime, message_type)| (*mime, *message_type))
}

/// Reads a file and turns it into an [`Attachment`].
///
/// # Errors
/// [`MediaError::UnsupportedType`] if the extension is not a known image or
/// video type (checked before reading), [`MediaError::Io`] if the file
/// cannot be read.
pub async fn load_attachment(path: impl AsRef<Path>) -> Result<Attachment, MediaError> {
    let path = path.as_ref();
    let (mime, message_type) = classify(path)
        .ok_or_else(|| MediaError::UnsupportedType(path.display().to_string()))?;

    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), mime, size = bytes.len(), "loaded attachment");

    Ok(Attachment {
        message_type,
        content: data_uri(mime, &bytes),
    })
}
