//! Connection management: one transport, one reconnect timer.
//!
//! [`ConnectionManager`] owns the session's transport and hides its churn
//! from the layer above. A reader task pumps frames off the transport into
//! a channel; [`ConnectionManager::next_event`] is the single place where
//! those frames, the transport's end, and the reconnect timer meet.
//!
//! # Reconnection
//!
//! When a transport ends, the manager arms a fixed-delay timer and reports
//! [`ConnectionEvent::Lost`] exactly once. While the timer is armed, further
//! disconnect notifications are swallowed and `connect` calls are ignored,
//! so there is never more than one pending reconnection. When the timer
//! fires, the manager dials the last endpoint again.
//!
//! Every transport gets a generation number. Events tagged with an older
//! generation come from a transport we already gave up on and are dropped.
//!
//! The manager is designed to sit inside the controller's `tokio::select!`:
//!
//! ```rust,ignore
//! loop {
//!     tokio::select! {
//!         cmd = commands.recv() => { /* handle command */ }
//!         event = connection.next_event() => { /* handle event */ }
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use roomlink_transport::{CloseInfo, Connection, ConnectionId, Connector, Incoming, TransportError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use crate::state::ConnectionState;

/// Why a transport ended.
#[derive(Debug)]
pub enum DisconnectReason {
    /// The server closed the connection, or the stream simply ended
    /// (reported as code 1006).
    Closed(CloseInfo),
    /// Connecting or reading failed.
    Failed(TransportError),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(info) => write!(f, "closed with {info}"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

/// What [`ConnectionManager::next_event`] reports to the session.
#[derive(Debug)]
pub enum ConnectionEvent {
    /// A transport is open and ready for frames.
    Opened(ConnectionId),
    /// One inbound text frame.
    Frame(String),
    /// The transport ended; a reconnection is now scheduled.
    Lost(DisconnectReason),
}

// ---------------------------------------------------------------------------
// Reader task plumbing
// ---------------------------------------------------------------------------

enum TransportEvent<T> {
    Opened(Arc<T>),
    Frame(String),
    Closed(CloseInfo),
    Failed(TransportError),
}

struct Tagged<T> {
    generation: u64,
    event: TransportEvent<T>,
}

enum Wake<T> {
    Transport(Tagged<T>),
    ReconnectDue,
}

/// Connects, then forwards every inbound frame until the transport ends.
///
/// Exits early if the manager has been dropped.
async fn pump_transport<C: Connector>(
    connector: Arc<C>,
    endpoint: String,
    generation: u64,
    tx: mpsc::UnboundedSender<Tagged<C::Connection>>,
) {
    let send = |event: TransportEvent<C::Connection>| tx.send(Tagged { generation, event }).is_ok();

    let conn = match connector.connect(&endpoint).await {
        Ok(conn) => Arc::new(conn),
        Err(e) => {
            send(TransportEvent::Failed(e));
            return;
        }
    };
    if !send(TransportEvent::Opened(Arc::clone(&conn))) {
        return;
    }

    loop {
        let event = match conn.recv().await {
            Ok(Incoming::Frame(text)) => TransportEvent::Frame(text),
            Ok(Incoming::Closed(info)) => {
                send(TransportEvent::Closed(info));
                return;
            }
            Err(e) => {
                send(TransportEvent::Failed(e));
                return;
            }
        };
        if !send(event) {
            return;
        }
    }
}

/// Sleeps until `deadline`, or forever if there is none.
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// ConnectionManager
// ---------------------------------------------------------------------------

/// Owns at most one live transport and at most one reconnect timer.
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    reconnect_delay: Duration,
    state: ConnectionState,
    /// The endpoint of the last `connect` call; reconnections reuse it.
    endpoint: Option<String>,
    generation: u64,
    connection: Option<Arc<C::Connection>>,
    /// The reconnect guard: `Some` while a reconnection is scheduled.
    reconnect_at: Option<Instant>,
    reader: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<Tagged<C::Connection>>,
    events_rx: mpsc::UnboundedReceiver<Tagged<C::Connection>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, reconnect_delay: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connector: Arc::new(connector),
            reconnect_delay,
            state: ConnectionState::Idle,
            endpoint: None,
            generation: 0,
            connection: None,
            reconnect_at: None,
            reader: None,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Whether a reconnection is scheduled.
    pub fn is_reconnect_pending(&self) -> bool {
        self.reconnect_at.is_some()
    }

    /// When the scheduled reconnection will fire, if one is scheduled.
    pub fn reconnect_deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Starts opening a transport to `endpoint`.
    ///
    /// Returns `false` and does nothing if a transport is already connecting
    /// or open, or if a reconnection is pending. Must be called from within
    /// a Tokio runtime.
    pub fn connect(&mut self, endpoint: &str) -> bool {
        match self.state {
            ConnectionState::Connecting
            | ConnectionState::Open
            | ConnectionState::ReconnectPending => {
                debug!(state = %self.state, "connect ignored");
                false
            }
            ConnectionState::Idle | ConnectionState::Closed => {
                self.endpoint = Some(endpoint.to_owned());
                self.open_transport(endpoint.to_owned());
                true
            }
        }
    }

    fn open_transport(&mut self, endpoint: String) {
        self.generation += 1;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }

        info!(endpoint = %endpoint, generation = self.generation, "connecting");
        self.state = ConnectionState::Connecting;
        self.reader = Some(tokio::spawn(pump_transport(
            Arc::clone(&self.connector),
            endpoint,
            self.generation,
            self.events_tx.clone(),
        )));
    }

    /// Sends one text frame.
    ///
    /// Returns `false` without sending when no transport is open, or when
    /// the transport rejects the frame. A failed send does not tear the
    /// connection down; the reader notices a dead transport on its own.
    pub async fn send(&mut self, frame: &str) -> bool {
        let conn = match (&self.connection, self.state) {
            (Some(conn), ConnectionState::Open) => Arc::clone(conn),
            _ => {
                debug!(state = %self.state, "frame dropped: not connected");
                return false;
            }
        };

        match conn.send_text(frame).await {
            Ok(()) => true,
            Err(e) => {
                warn!(id = %conn.id(), error = %e, "send failed");
                false
            }
        }
    }

    /// Waits for the next thing the session needs to know about.
    ///
    /// Reconnect timer expiry is handled internally and never surfaces as an
    /// event; the resulting [`ConnectionEvent::Opened`] does. Cancel-safe:
    /// dropping the future loses nothing.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            let deadline = self.reconnect_at;
            let wake = tokio::select! {
                Some(tagged) = self.events_rx.recv() => Wake::Transport(tagged),
                () = sleep_until_deadline(deadline) => Wake::ReconnectDue,
            };

            let event = match wake {
                Wake::Transport(tagged) => self.on_transport_event(tagged),
                Wake::ReconnectDue => {
                    self.reconnect_now();
                    None
                }
            };
            if let Some(event) = event {
                return event;
            }
        }
    }

    fn on_transport_event(&mut self, tagged: Tagged<C::Connection>) -> Option<ConnectionEvent> {
        if tagged.generation != self.generation {
            trace!(
                stale = tagged.generation,
                current = self.generation,
                "discarding event from superseded transport"
            );
            return None;
        }

        match tagged.event {
            TransportEvent::Opened(conn) => {
                let id = conn.id();
                info!(%id, "connection open");
                self.connection = Some(conn);
                self.state = ConnectionState::Open;
                Some(ConnectionEvent::Opened(id))
            }
            TransportEvent::Frame(text) => Some(ConnectionEvent::Frame(text)),
            TransportEvent::Closed(info) => self.transport_lost(DisconnectReason::Closed(info)),
            TransportEvent::Failed(e) => self.transport_lost(DisconnectReason::Failed(e)),
        }
    }

    /// Records that the transport ended and schedules a reconnection.
    ///
    /// Returns the `Lost` event to report, or `None` if a reconnection was
    /// already pending or the manager has been shut down.
    pub(crate) fn transport_lost(&mut self, reason: DisconnectReason) -> Option<ConnectionEvent> {
        self.connection = None;

        if self.state == ConnectionState::Idle {
            debug!(%reason, "transport ended after shutdown");
            return None;
        }
        if self.reconnect_at.is_some() {
            debug!(%reason, "reconnection already pending");
            return None;
        }

        self.state = ConnectionState::Closed;
        warn!(
            %reason,
            delay_ms = self.reconnect_delay.as_millis() as u64,
            "connection lost, scheduling reconnect"
        );
        self.reconnect_at = Some(Instant::now() + self.reconnect_delay);
        self.state = ConnectionState::ReconnectPending;
        Some(ConnectionEvent::Lost(reason))
    }

    fn reconnect_now(&mut self) {
        self.reconnect_at = None;
        self.state = ConnectionState::Closed;
        match self.endpoint.clone() {
            Some(endpoint) => self.open_transport(endpoint),
            None => self.state = ConnectionState::Idle,
        }
    }

    /// Cancels any pending reconnection and closes the transport.
    ///
    /// Afterwards the manager is `Idle`; events from the old transport are
    /// discarded and no reconnection will happen unless `connect` is called
    /// again.
    pub async fn shutdown(&mut self) {
        self.reconnect_at = None;
        self.generation += 1;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(conn) = self.connection.take() {
            if let Err(e) = conn.close().await {
                debug!(id = %conn.id(), error = %e, "close failed during shutdown");
            }
        }
        self.state = ConnectionState::Idle;
        info!("connection shut down");
    }
}

impl<C: Connector> Drop for ConnectionManager<C> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
