//! The session controller: protocol dispatch and the join flow.
//!
//! A [`SessionController`] runs as a single task. It owns the connection,
//! the roster, and the session state; nothing else touches them. The UI
//! talks to it through a [`SessionHandle`] (commands in) and a
//! [`SessionEvent`] receiver (notifications out).
//!
//! ```text
//!   SessionHandle ──Command──→ ┌───────────────────┐ ──SessionEvent──→ UI
//!                              │ SessionController │
//!   ConnectionManager ───────→ └───────────────────┘ ──SessionStatus──→ watch
//! ```

use roomlink_protocol::{ChatMessage, Envelope, EnvelopeCodec, MessageType, User, UserEntry};
use roomlink_transport::Connector;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::connection::{ConnectionEvent, ConnectionManager};
use crate::error::{SessionError, ValidationError};
use crate::join::JoinRequest;
use crate::roster::RosterStore;
use crate::state::{SessionState, SessionStatus};

/// Shown every time the connection drops.
pub const CONNECTION_LOST_NOTICE: &str =
    "The connection to the server has been lost. Attempting to reconnect...";

/// Shown, in order, when the server first admits us to the room.
pub const ONBOARDING_NOTICES: [&str; 3] = [
    "Welcome to the room!",
    "Nothing is kept here: no personal data and no chat history.",
    "Remember that what you read here is not always true.",
];

/// Something the UI should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A line of system text: server notices, departures, connection trouble.
    SystemNotice(String),

    /// A chat message. `outgoing` is true when the local user sent it.
    UserMessage {
        user: User,
        message: ChatMessage,
        outgoing: bool,
    },

    /// The member list changed. `users` has the local user first.
    RosterChanged { users: Vec<User>, online: usize },

    /// A join request failed local validation.
    JoinRejected(ValidationError),

    /// A message went out; the compose box can be emptied.
    ComposeCleared,
}

#[derive(Debug)]
enum Command {
    Join(JoinRequest),
    Send {
        message_type: MessageType,
        content: String,
    },
    Shutdown,
}

enum Step {
    Command(Command),
    Connection(ConnectionEvent),
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// A cheap, cloneable handle for driving a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
    status: watch::Receiver<SessionStatus>,
    max_name_chars: usize,
}

impl SessionHandle {
    /// Asks to join the room as `name` with the avatar `avatar_id`.
    ///
    /// The name is validated here, before any connection is attempted. On
    /// failure a [`SessionEvent::JoinRejected`] is emitted as well, so a UI
    /// that only listens to events still sees it.
    ///
    /// # Errors
    /// [`SessionError::Validation`] for a bad name, [`SessionError::Closed`]
    /// if the controller is gone.
    pub fn join(&self, name: &str, avatar_id: &str) -> Result<(), SessionError> {
        let request = match JoinRequest::new(name, avatar_id, self.max_name_chars) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "join rejected");
                if self
                    .events
                    .send(SessionEvent::JoinRejected(e.clone()))
                    .is_err()
                {
                    trace!("event receiver dropped");
                }
                return Err(e.into());
            }
        };
        self.command(Command::Join(request))
    }

    /// Sends a message to the room.
    ///
    /// Quietly does nothing if `content` is blank, the user has not joined,
    /// or the connection is down.
    pub fn send_message(
        &self,
        message_type: MessageType,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.command(Command::Send {
            message_type,
            content: content.into(),
        })
    }

    /// Shorthand for a [`MessageType::Text`] message.
    pub fn send_text(&self, content: impl Into<String>) -> Result<(), SessionError> {
        self.send_message(MessageType::Text, content)
    }

    /// Stops the session: cancels reconnection and closes the connection.
    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.command(Command::Shutdown)
    }

    /// The latest published status.
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// A receiver that is notified whenever the status changes.
    pub fn watch_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    fn command(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).map_err(|_| SessionError::Closed)
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Drives one chat session.
pub struct SessionController<C: Connector> {
    config: SessionConfig,
    connection: ConnectionManager<C>,
    roster: RosterStore,
    codec: EnvelopeCodec,
    state: SessionState,
    /// Kept after the first join so reconnects can re-join.
    credentials: Option<JoinRequest>,
    /// Our own identity, as assigned by the server.
    local_user: Option<User>,
    dropped_envelopes: u64,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionEvent>,
    status: watch::Sender<SessionStatus>,
}

impl<C: Connector> SessionController<C> {
    /// Creates a controller plus the handle and event stream that talk to it.
    ///
    /// The controller does nothing until [`run`](Self::run) is awaited.
    pub fn new(
        config: SessionConfig,
        connector: C,
    ) -> (Self, SessionHandle, mpsc::UnboundedReceiver<SessionEvent>) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SessionStatus::default());

        let handle = SessionHandle {
            commands: commands_tx,
            events: events_tx.clone(),
            status: status_rx,
            max_name_chars: config.max_name_chars,
        };

        let controller = Self {
            connection: ConnectionManager::new(connector, config.reconnect_delay),
            config,
            roster: RosterStore::new(),
            codec: EnvelopeCodec,
            state: SessionState::LoggedOut,
            credentials: None,
            local_user: None,
            dropped_envelopes: 0,
            commands: commands_rx,
            events: events_tx,
            status: status_tx,
        };

        (controller, handle, events_rx)
    }

    /// Creates a controller and runs it on a new Tokio task.
    pub fn spawn(
        config: SessionConfig,
        connector: C,
    ) -> (
        SessionHandle,
        mpsc::UnboundedReceiver<SessionEvent>,
        JoinHandle<()>,
    ) {
        let (controller, handle, events) = Self::new(config, connector);
        let task = tokio::spawn(controller.run());
        (handle, events, task)
    }

    /// Runs the session until [`SessionHandle::shutdown`] is called or every
    /// handle is dropped.
    pub async fn run(mut self) {
        info!(endpoint = %self.config.endpoint, "session started");

        loop {
            let step = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => Step::Command(command),
                },
                event = self.connection.next_event() => Step::Connection(event),
            };

            match step {
                Step::Command(command) => self.handle_command(command).await,
                Step::Connection(event) => self.handle_connection_event(event).await,
            }
            self.publish_status();
        }

        self.connection.shutdown().await;
        self.state = SessionState::LoggedOut;
        self.local_user = None;
        self.roster.clear();
        self.publish_status();
        info!("session stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Join(request) => self.start_join(request),
            Command::Send {
                message_type,
                content,
            } => self.send_message(message_type, content).await,
            // Handled by the run loop.
            Command::Shutdown => {}
        }
    }

    fn start_join(&mut self, request: JoinRequest) {
        if self.state != SessionState::LoggedOut {
            debug!(state = %self.state, "join ignored: already joining or joined");
            return;
        }

        info!(name = %request.name, "joining room");
        self.credentials = Some(request);
        self.state = SessionState::Joining;
        self.connection.connect(&self.config.endpoint);
    }

    async fn send_message(&mut self, message_type: MessageType, content: String) {
        let content = match message_type {
            MessageType::Text => content.trim().to_owned(),
            _ => content,
        };
        if content.trim().is_empty() {
            trace!("message dropped: empty");
            return;
        }
        if self.local_user.is_none() {
            debug!("message dropped: not in a room");
            return;
        }
        if !self.connection.is_open() {
            debug!(state = %self.connection.state(), "message dropped: not connected");
            return;
        }

        let envelope = Envelope::Message {
            message_type,
            content,
        };
        if self.send_envelope(&envelope).await {
            self.emit(SessionEvent::ComposeCleared);
        }
    }

    async fn send_envelope(&mut self, envelope: &Envelope) -> bool {
        match self.codec.encode(envelope) {
            Ok(frame) => self.connection.send(&frame).await,
            Err(e) => {
                warn!(kind = envelope.kind(), error = %e, "failed to encode envelope");
                false
            }
        }
    }

    async fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened(id) => {
                let join = self.credentials.as_ref().map(JoinRequest::to_envelope);
                if let Some(join) = join {
                    debug!(%id, "connection open, sending join");
                    self.send_envelope(&join).await;
                }
            }
            ConnectionEvent::Frame(text) => self.handle_frame(&text),
            ConnectionEvent::Lost(reason) => {
                info!(%reason, state = %self.state, "connection lost");
                self.emit(SessionEvent::SystemNotice(CONNECTION_LOST_NOTICE.to_string()));

                if self.state == SessionState::InRoom {
                    self.state = SessionState::Joining;
                }
                self.local_user = None;
                if !self.roster.is_empty() {
                    self.roster.clear();
                    self.emit(SessionEvent::RosterChanged {
                        users: Vec::new(),
                        online: 0,
                    });
                }
            }
        }
    }

    fn handle_frame(&mut self, text: &str) {
        let envelope = match self.codec.decode(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.dropped_envelopes += 1;
                if e.is_unknown_kind() {
                    debug!(error = %e, "ignoring envelope");
                } else {
                    warn!(error = %e, "dropping malformed envelope");
                }
                return;
            }
        };

        match envelope {
            Envelope::UserJoined { user, users } => {
                if self.local_user.is_none() {
                    info!(id = %user.id, name = %user.name, "joined room");
                    self.local_user = Some(user);
                }
                self.apply_roster(users);

                if self.state == SessionState::Joining {
                    self.state = SessionState::InRoom;
                    for notice in ONBOARDING_NOTICES {
                        self.emit(SessionEvent::SystemNotice(notice.to_string()));
                    }
                }
            }
            Envelope::UserList { users } => self.apply_roster(users),
            Envelope::NewMessage { user, message } => {
                let outgoing = self.local_user.as_ref().is_some_and(|me| me.id == user.id);
                self.emit(SessionEvent::UserMessage {
                    user,
                    message,
                    outgoing,
                });
            }
            Envelope::SystemMessage { message } => {
                self.emit(SessionEvent::SystemNotice(message));
            }
            Envelope::UserLeft { user, users } => {
                self.apply_roster(users);
                self.emit(SessionEvent::SystemNotice(format!("{} left the room", user.name)));
            }
            other @ (Envelope::Join { .. } | Envelope::Message { .. }) => {
                self.dropped_envelopes += 1;
                debug!(kind = other.kind(), "ignoring client-to-server envelope from server");
            }
        }
    }

    fn apply_roster(&mut self, entries: Vec<UserEntry>) {
        let local = self.local_user.as_ref().map(|user| &user.id);
        let users = self.roster.apply(entries, local).to_vec();
        let online = users.len();
        self.emit(SessionEvent::RosterChanged { users, online });
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            trace!("event receiver dropped");
        }
    }

    fn publish_status(&self) {
        self.status.send_replace(SessionStatus {
            session: self.state,
            connection: self.connection.state(),
            dropped_envelopes: self.dropped_envelopes,
        });
    }
}
