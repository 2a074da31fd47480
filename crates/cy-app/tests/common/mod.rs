//! In-memory fakes for the hub's ports.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use cy_app::{ConnectionRegistry, SyncHub, SyncHubDeps};
use cy_core::ports::{
    ClipboardPort, ImageSinkPort, NotifierPort, PeerConnection, PeerListener, PeerSink, PeerStream,
    PeerTransportPort,
};
use cy_core::{
    BindError, ClipboardError, ClipboardSnapshot, ConnectionId, TaggedCodec, TransportError,
    WireCodec,
};

pub const WAIT: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Clipboard
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeClipboard {
    content: Mutex<Option<ClipboardSnapshot>>,
    writes: Mutex<Vec<ClipboardSnapshot>>,
    pub fail_writes: AtomicBool,
}

impl FakeClipboard {
    /// Simulate the user copying text.
    pub fn copy_text(&self, text: &str) {
        *self.content.lock().unwrap() = Some(ClipboardSnapshot::text(text));
    }

    pub fn current(&self) -> Option<ClipboardSnapshot> {
        self.content.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<ClipboardSnapshot> {
        self.writes.lock().unwrap().clone()
    }
}

impl ClipboardPort for FakeClipboard {
    fn read(&self) -> Result<Option<ClipboardSnapshot>, ClipboardError> {
        Ok(self.current())
    }

    fn write(&self, snapshot: &ClipboardSnapshot) -> Result<(), ClipboardError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClipboardError::Write("clipboard locked".into()));
        }
        *self.content.lock().unwrap() = Some(snapshot.clone());
        self.writes.lock().unwrap().push(snapshot.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles().iter().any(|t| t == title)
    }
}

impl NotifierPort for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

struct MemorySink {
    tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl PeerSink for MemorySink {
    async fn send(&self, message: &str) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::Io("simulated write failure".into()));
        }
        let guard = self.tx.lock().unwrap();
        let tx = guard.as_ref().ok_or(TransportError::Closed)?;
        tx.send(message.to_string()).map_err(|_| TransportError::Closed)
    }

    async fn close(&self) {
        self.tx.lock().unwrap().take();
    }
}

struct MemoryStream {
    rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl PeerStream for MemoryStream {
    async fn recv(&mut self) -> Option<Result<String, TransportError>> {
        self.rx.recv().await.map(Ok)
    }
}

/// The remote end of an in-memory connection.
pub struct MemoryPeer {
    pub id: ConnectionId,
    outbox: Option<mpsc::UnboundedSender<String>>,
    inbox: mpsc::UnboundedReceiver<String>,
    fail: Arc<AtomicBool>,
}

impl MemoryPeer {
    /// Create a peer and the server-side halves of its connection.
    pub fn pair(id: &str) -> (MemoryPeer, PeerConnection) {
        let (to_peer_tx, to_peer_rx) = mpsc::unbounded_channel();
        let (from_peer_tx, from_peer_rx) = mpsc::unbounded_channel();
        let fail = Arc::new(AtomicBool::new(false));
        let id = ConnectionId::from(id);

        let connection = PeerConnection {
            id: id.clone(),
            remote: None,
            sink: Arc::new(MemorySink {
                tx: Mutex::new(Some(to_peer_tx)),
                fail: fail.clone(),
            }),
            stream: Box::new(MemoryStream { rx: from_peer_rx }),
        };
        let peer = MemoryPeer {
            id,
            outbox: Some(from_peer_tx),
            inbox: to_peer_rx,
            fail,
        };
        (peer, connection)
    }

    pub fn send(&self, message: &str) {
        if let Some(outbox) = &self.outbox {
            let _ = outbox.send(message.to_string());
        }
    }

    /// Drop the write side, as a client closing its socket would.
    pub fn hang_up(&mut self) {
        self.outbox.take();
    }

    pub fn break_writes(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Messages the hub delivered so far.
    pub fn drain(&mut self) -> Vec<String> {
        let mut received = Vec::new();
        while let Ok(message) = self.inbox.try_recv() {
            received.push(message);
        }
        received
    }

    pub async fn next(&mut self) -> Option<String> {
        tokio::time::timeout(WAIT, self.inbox.recv()).await.ok().flatten()
    }

    /// True once the hub closed this connection.
    pub async fn is_closed(&mut self) -> bool {
        matches!(
            tokio::time::timeout(WAIT, self.inbox.recv()).await,
            Ok(None)
        )
    }
}

#[derive(Default)]
struct TransportInner {
    bound: HashSet<SocketAddr>,
    busy: HashSet<SocketAddr>,
    incoming: HashMap<SocketAddr, mpsc::UnboundedSender<PeerConnection>>,
}

/// Transport whose listeners live in memory.
#[derive(Default, Clone)]
pub struct MemoryTransport {
    inner: Arc<Mutex<TransportInner>>,
}

impl MemoryTransport {
    /// Make `addr` unavailable, as another process holding the port would.
    pub fn occupy(&self, addr: SocketAddr) {
        self.inner.lock().unwrap().busy.insert(addr);
    }

    pub fn is_bound(&self, addr: SocketAddr) -> bool {
        self.inner.lock().unwrap().bound.contains(&addr)
    }

    /// Connect a new peer to the listener bound at `addr`.
    pub fn connect(&self, addr: SocketAddr, id: &str) -> Option<MemoryPeer> {
        let inner = self.inner.lock().unwrap();
        let incoming = inner.incoming.get(&addr)?;
        let (peer, connection) = MemoryPeer::pair(id);
        incoming.send(connection).ok()?;
        Some(peer)
    }
}

struct MemoryListener {
    addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<PeerConnection>,
    inner: Arc<Mutex<TransportInner>>,
}

impl Drop for MemoryListener {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.bound.remove(&self.addr);
        inner.incoming.remove(&self.addr);
    }
}

#[async_trait]
impl PeerListener for MemoryListener {
    fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    async fn accept(&mut self) -> Result<PeerConnection, TransportError> {
        self.rx.recv().await.ok_or(TransportError::Closed)
    }
}

#[async_trait]
impl PeerTransportPort for MemoryTransport {
    async fn bind(&self, addr: SocketAddr) -> Result<Box<dyn PeerListener>, BindError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.busy.contains(&addr) || inner.bound.contains(&addr) {
            return Err(BindError::AddrInUse(addr));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        inner.bound.insert(addr);
        inner.incoming.insert(addr, tx);
        Ok(Box::new(MemoryListener {
            addr,
            rx,
            inner: self.inner.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Hub wiring
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub hub: Arc<SyncHub>,
    pub clipboard: Arc<FakeClipboard>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn hub_with(codec: Arc<dyn WireCodec>, image_sink: Option<Arc<dyn ImageSinkPort>>) -> Fixture {
    let clipboard = Arc::new(FakeClipboard::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let hub = Arc::new(SyncHub::from_deps(SyncHubDeps {
        registry: Arc::new(ConnectionRegistry::new()),
        clipboard: clipboard.clone(),
        codec,
        notifier: notifier.clone(),
        image_sink,
    }));
    Fixture {
        hub,
        clipboard,
        notifier,
    }
}

pub fn hub() -> Fixture {
    hub_with(Arc::new(TaggedCodec), None)
}

/// Register a peer directly with the hub, bypassing any listener.
pub async fn attach(fixture: &Fixture, id: &str) -> MemoryPeer {
    let (peer, connection) = MemoryPeer::pair(id);
    fixture.hub.connect_peer(connection.id, connection.sink).await;
    peer
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
