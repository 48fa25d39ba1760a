//! Wire types for the chat protocol.
//!
//! Every frame on the connection is one flat JSON object with a `type`
//! discriminator. This module defines those objects and the user/message
//! records nested inside them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Server-assigned identity of a room member.
///
/// The client never creates or interprets these; it only compares them.
/// Servers in the wild send either numbers or strings, so both are kept
/// as-is and encode back to the same JSON shape.
///
/// `#[serde(untagged)]` means there is no wrapper in JSON: `1` becomes
/// `UserId::Number(1)` and `"a1"` becomes `UserId::Text("a1")`. Variants
/// are tried in order, so `OtherNumber` only catches what `u64` can't hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    /// A numeric id, e.g. `1`.
    Number(u64),
    /// A textual id, e.g. `"7f3a"`.
    Text(String),
    /// Any other JSON number: negative or fractional ids.
    OtherNumber(serde_json::Number),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::OtherNumber(n) => write!(f, "{n}"),
        }
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// A member of the room, as announced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identity.
    pub id: UserId,
    /// Display name (at most 8 characters when set by a client).
    pub name: String,
    /// Avatar image URL. Missing avatars decode as an empty string.
    #[serde(default)]
    pub avatar: String,
}

impl User {
    /// Creates a user record.
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }
}

/// One entry of a roster push, decoded leniently.
///
/// A single broken member must not cost us the whole roster, so every field
/// is optional here. [`UserEntry::into_user`] decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserEntry {
    /// Converts the entry into a [`User`], or `None` if the id or the name
    /// is missing.
    pub fn into_user(self) -> Option<User> {
        Some(User {
            id: self.id?,
            name: self.name?,
            avatar: self.avatar.unwrap_or_default(),
        })
    }
}

/// Decodes a roster array one entry at a time.
///
/// An entry that isn't a well-formed member object (`null`, a mistyped
/// field, ...) becomes an empty [`UserEntry`], which
/// [`UserEntry::into_user`] later rejects. The rest of the roster survives.
fn lenient_roster<'de, D>(deserializer: D) -> Result<Vec<UserEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

impl From<User> for UserEntry {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            name: Some(user.name),
            avatar: Some(user.avatar),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// What a chat message's `content` holds.
///
/// Image and video content is a self-contained data URI, so the renderer
/// can inline it without another fetch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Plain text.
    #[default]
    Text,
    /// An embedded image.
    Image,
    /// An embedded video.
    Video,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
        })
    }
}

/// When the server stamped a message.
///
/// Kept exactly as sent: either epoch milliseconds or a textual instant
/// such as RFC 3339. Formatting is the renderer's business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Any textual representation.
    Text(String),
    /// A number that isn't whole millis, e.g. `1700000000000.5`.
    OtherNumber(serde_json::Number),
}

/// A chat message relayed by the server.
///
/// Immutable once received: the client renders it and lets it go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "messageType")]
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// One frame of the chat protocol.
///
/// `#[serde(tag = "type")]` produces flat, internally tagged JSON:
///
/// ```text
/// { "type": "join", "name": "Alice", "avatar": "https://..." }
/// { "type": "system_message", "message": "Server restarting" }
/// ```
///
/// `rename_all = "snake_case"` maps `UserJoined` to `"user_joined"` and so
/// on. The roster-carrying kinds always ship the complete member list; the
/// protocol has no incremental diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Client → Server: "Let me in, this is who I am."
    Join { name: String, avatar: String },

    /// Server → Client: someone (possibly us) joined; full roster attached.
    UserJoined {
        user: User,
        #[serde(deserialize_with = "lenient_roster")]
        users: Vec<UserEntry>,
    },

    /// Server → Client: the current roster.
    UserList {
        #[serde(deserialize_with = "lenient_roster")]
        users: Vec<UserEntry>,
    },

    /// Client → Server: post a message to the room.
    Message {
        #[serde(rename = "messageType")]
        message_type: MessageType,
        content: String,
    },

    /// Server → Client: a member posted a message.
    NewMessage { user: User, message: ChatMessage },

    /// Server → Client: a plain-text notice from the server.
    SystemMessage { message: String },

    /// Server → Client: someone left; full roster attached.
    UserLeft {
        user: User,
        #[serde(deserialize_with = "lenient_roster")]
        users: Vec<UserEntry>,
    },
}

impl Envelope {
    /// Every `type` value this client understands.
    pub const KINDS: [&'static str; 7] = [
        "join",
        "user_joined",
        "user_list",
        "message",
        "new_message",
        "system_message",
        "user_left",
    ];

    /// The wire name of this envelope's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::UserJoined { .. } => "user_joined",
            Self::UserList { .. } => "user_list",
            Self::Message { .. } => "message",
            Self::NewMessage { .. } => "new_message",
            Self::SystemMessage { .. } => "system_message",
            Self::UserLeft { .. } => "user_left",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
