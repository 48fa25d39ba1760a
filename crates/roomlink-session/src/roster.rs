//! The local copy of the room's member list.

use roomlink_protocol::{User, UserEntry, UserId};
use tracing::debug;

/// Holds the latest roster pushed by the server.
///
/// Every push replaces the whole list; there are no incremental updates.
/// The local user, when present, always sits at index 0 so a UI can pin
/// "you" to the top.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    members: Vec<User>,
}

impl RosterStore {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the roster with `entries` and returns the new ordering.
    ///
    /// Entries missing an id or a name are skipped. If `local` matches a
    /// member, that member is moved to the front; the others keep the order
    /// the server sent.
    pub fn apply(&mut self, entries: Vec<UserEntry>, local: Option<&UserId>) -> &[User] {
        let total = entries.len();
        let mut members: Vec<User> = entries.into_iter().filter_map(UserEntry::into_user).collect();
        if members.len() < total {
            debug!(
                skipped = total - members.len(),
                "ignoring malformed roster entries"
            );
        }

        if let Some(pos) = local.and_then(|id| members.iter().position(|user| &user.id == id)) {
            members[..=pos].rotate_right(1);
        }

        self.members = members;
        &self.members
    }

    /// Number of members online.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The current members, local user first.
    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// Forgets every member.
    pub fn clear(&mut self) {
        self.members.clear();
    }
}
