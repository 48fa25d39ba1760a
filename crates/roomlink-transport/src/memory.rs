//! In-process transport backed by Tokio channels.
//!
//! [`pair`] returns a [`MemoryConnector`] for the client side and a
//! [`MemoryListener`] that plays the server: every successful
//! [`Connector::connect`] shows up as a [`MemoryPeer`] on the listener.
//! Dropping a peer ends the client's stream with code 1006, the same way a
//! dead TCP socket would.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::{CloseInfo, Connection, ConnectionId, Connector, Incoming, TransportError};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A frame travelling from the server side to the client.
#[derive(Debug)]
enum PeerFrame {
    Text(String),
    Close(CloseInfo),
}

#[derive(Debug, Default)]
struct Counters {
    attempts: AtomicUsize,
    refuse_next: AtomicUsize,
}

/// Creates a connected connector/listener pair.
pub fn pair() -> (MemoryConnector, MemoryListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    let counters = Arc::new(Counters::default());
    (
        MemoryConnector {
            incoming: tx,
            counters: Arc::clone(&counters),
        },
        MemoryListener {
            incoming: rx,
            counters,
        },
    )
}

/// Client side of the in-memory transport. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    incoming: mpsc::UnboundedSender<MemoryPeer>,
    counters: Arc<Counters>,
}

impl MemoryConnector {
    /// Number of `connect` calls made so far, successful or not.
    pub fn attempts(&self) -> usize {
        self.counters.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(
        &self,
        endpoint: &str,
    ) -> Result<Self::Connection, TransportError> {
        self.counters.attempts.fetch_add(1, Ordering::SeqCst);

        let refused = self
            .counters
            .refuse_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            })
            .is_ok();
        if refused {
            return Err(TransportError::ConnectFailed(format!(
                "{endpoint}: connection refused"
            )));
        }

        let (to_peer, from_client) = mpsc::unbounded_channel();
        let (to_client, from_peer) = mpsc::unbounded_channel();
        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );

        let peer = MemoryPeer {
            id,
            endpoint: endpoint.to_owned(),
            inbound: from_client,
            outbound: to_client,
        };
        self.incoming.send(peer).map_err(|_| {
            TransportError::ConnectFailed(format!("{endpoint}: no listener"))
        })?;

        tracing::debug!(%id, endpoint, "memory connection established");
        Ok(MemoryConnection {
            id,
            outbound: Mutex::new(Some(to_peer)),
            inbound: Mutex::new(from_peer),
        })
    }
}

/// Server side of the in-memory transport.
#[derive(Debug)]
pub struct MemoryListener {
    incoming: mpsc::UnboundedReceiver<MemoryPeer>,
    counters: Arc<Counters>,
}

impl MemoryListener {
    /// Waits for the next client connection.
    ///
    /// Returns `None` once every connector has been dropped.
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.incoming.recv().await
    }

    /// Returns a client connection that has already arrived, without waiting.
    pub fn accept_now(&mut self) -> Option<MemoryPeer> {
        self.incoming.try_recv().ok()
    }

    /// Makes the next `n` connection attempts fail.
    pub fn refuse_next(&self, n: usize) {
        self.counters.refuse_next.store(n, Ordering::SeqCst);
    }
}

/// The server's end of one in-memory connection.
#[derive(Debug)]
pub struct MemoryPeer {
    id: ConnectionId,
    endpoint: String,
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<PeerFrame>,
}

impl MemoryPeer {
    /// The id of the matching client connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The endpoint the client dialed.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a text frame to the client. Returns `false` if the client is gone.
    pub fn send(&self, text: impl Into<String>) -> bool {
        self.outbound.send(PeerFrame::Text(text.into())).is_ok()
    }

    /// Receives the next frame the client sent.
    ///
    /// Returns `None` once the client has closed or dropped its connection.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Sends a close frame with the given code and ends the connection.
    pub fn close(self, code: u16, reason: &str) {
        let _ = self
            .outbound
            .send(PeerFrame::Close(CloseInfo::new(code, reason)));
    }
}

/// The client's end of one in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    id: ConnectionId,
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
    inbound: Mutex<mpsc::UnboundedReceiver<PeerFrame>>,
}

impl Connection for MemoryConnection {
    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        let outbound = self.outbound.lock().await;
        let Some(tx) = outbound.as_ref() else {
            return Err(TransportError::ConnectionClosed(
                "closed locally".into(),
            ));
        };
        tx.send(text.to_owned()).map_err(|_| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "peer dropped",
            ))
        })
    }

    async fn recv(&self) -> Result<Incoming, TransportError> {
        match self.inbound.lock().await.recv().await {
            Some(PeerFrame::Text(text)) => Ok(Incoming::Frame(text)),
            Some(PeerFrame::Close(info)) => Ok(Incoming::Closed(info)),
            None => Ok(Incoming::Closed(CloseInfo::abnormal())),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        // Dropping the sender ends the peer's `recv` loop.
        self.outbound.lock().await.take();
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
