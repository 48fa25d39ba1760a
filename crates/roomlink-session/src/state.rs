//! Connection and session state machines.

use std::fmt;

/// Lifecycle of the single transport a session owns.
///
/// ```text
///   Idle ──connect──→ Connecting ──opened──→ Open
///                        │                    │
///                        └──error/close──┬────┘
///                                        ▼
///                                     Closed ──→ ReconnectPending
///                                                   │ (delay)
///                        Connecting ←───────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport and nothing scheduled.
    #[default]
    Idle,
    /// A transport is being opened.
    Connecting,
    /// The transport is up; frames can be sent.
    Open,
    /// The transport ended and no reconnection is scheduled yet.
    Closed,
    /// A reconnection timer is outstanding.
    ReconnectPending,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::ReconnectPending => "reconnect-pending",
        })
    }
}

/// Where the user is in the join flow.
///
/// ```text
///   LoggedOut ──join──→ Joining ──user_joined──→ InRoom
///                          ↑                        │
///                          └──────disconnect────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No join has been requested.
    #[default]
    LoggedOut,
    /// Join requested; waiting for the server to admit us.
    Joining,
    /// Admitted; the roster and messages are live.
    InRoom,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LoggedOut => "logged-out",
            Self::Joining => "joining",
            Self::InRoom => "in-room",
        })
    }
}

/// A point-in-time view of the session, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    pub session: SessionState,
    pub connection: ConnectionState,
    /// Inbound frames discarded as unknown, malformed, or misdirected.
    pub dropped_envelopes: u64,
}
