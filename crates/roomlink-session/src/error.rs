//! Error types for the session layer.

/// Bad local input, reported synchronously and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The name is empty once surrounding whitespace is trimmed.
    #[error("please enter a name")]
    EmptyName,

    /// The trimmed name has more characters than the limit allows.
    #[error("name is {len} characters long, the limit is {max}")]
    NameTooLong { len: usize, max: usize },
}

/// Errors returned by [`SessionHandle`](crate::SessionHandle) commands.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The join request was rejected before any connection attempt.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The controller task has stopped; the command went nowhere.
    #[error("session has shut down")]
    Closed,
}
