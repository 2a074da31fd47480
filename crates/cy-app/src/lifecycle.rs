//! Lifecycle controller
//!
//! Finite-state controller (`Stopped → Running ⇄ Paused`) gating the
//! watcher and the accept loop. The UI collaborator only issues these calls
//! and subscribes to the observability hooks; it never touches hub state.
//!
//! | call   | from      | effect                                              |
//! |--------|-----------|-----------------------------------------------------|
//! | start  | Stopped   | bind, spawn accept loop + watcher → Running          |
//! | pause  | Running   | watcher and read loops idle → Paused                |
//! | resume | Paused    | replace watcher (re-seeded) → Running               |
//! | exit   | any       | cancel everything, close peers, release socket → Stopped |
//!
//! Calls that do not apply in the current state are no-ops.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cy_core::ports::{NotifierPort, PeerTransportPort};
use cy_core::{BindError, LifecycleOutcome, ServerState};

use crate::hub::SyncHub;
use crate::session::run_accept_loop;
use crate::watcher::ClipboardWatcher;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to start sync server: {0}")]
    Bind(#[from] BindError),
}

/// State and peer count as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubStatus {
    pub state: ServerState,
    pub peers: usize,
}

/// Static settings for the controller.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub bind_addr: SocketAddr,
    pub ws_path: String,
    pub poll_interval: Duration,
}

/// Helper for constructing the controller with explicit dependency fields.
pub struct LifecycleDeps {
    pub hub: Arc<SyncHub>,
    pub transport: Arc<dyn PeerTransportPort>,
    pub notifier: Arc<dyn NotifierPort>,
    pub settings: LifecycleSettings,
}

struct WatcherTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl WatcherTask {
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "clipboard watcher task failed");
        }
    }
}

/// Resources owned while the server is Running or Paused.
struct Session {
    cancel: CancellationToken,
    local_addr: SocketAddr,
    accept: JoinHandle<()>,
    watcher: WatcherTask,
}

pub struct LifecycleController {
    hub: Arc<SyncHub>,
    transport: Arc<dyn PeerTransportPort>,
    notifier: Arc<dyn NotifierPort>,
    settings: LifecycleSettings,
    state_tx: watch::Sender<ServerState>,
    /// Also serializes lifecycle calls.
    session: Mutex<Option<Session>>,
}

impl LifecycleController {
    pub fn from_deps(deps: LifecycleDeps) -> Self {
        let LifecycleDeps {
            hub,
            transport,
            notifier,
            settings,
        } = deps;
        let (state_tx, _) = watch::channel(ServerState::Stopped);

        Self {
            hub,
            transport,
            notifier,
            settings,
            state_tx,
            session: Mutex::new(None),
        }
    }

    pub fn hub(&self) -> &Arc<SyncHub> {
        &self.hub
    }

    pub fn state(&self) -> ServerState {
        *self.state_tx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.state_tx.subscribe()
    }

    pub fn subscribe_peers(&self) -> watch::Receiver<usize> {
        self.hub.registry().subscribe()
    }

    pub async fn status(&self) -> HubStatus {
        HubStatus {
            state: self.state(),
            peers: self.hub.registry().size().await,
        }
    }

    /// Bound listener address while Running or Paused.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.session.lock().await.as_ref().map(|s| s.local_addr)
    }

    /// URL peers use to connect, e.g. `ws://192.168.1.20:8080/ws`.
    pub async fn connect_url(&self) -> Option<String> {
        let addr = self.local_addr().await?;
        Some(format!("ws://{addr}{}", self.settings.ws_path))
    }

    /// Bind the listener and begin syncing.
    pub async fn start(&self) -> Result<LifecycleOutcome, LifecycleError> {
        let mut session = self.session.lock().await;
        let from = self.state();
        if from != ServerState::Stopped {
            info!(state = %from, "server is already running");
            self.notifier.notify("Running", "Server is already running");
            return Ok(LifecycleOutcome::NoOp { state: from });
        }

        let listener = match self.transport.bind(self.settings.bind_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(addr = %self.settings.bind_addr, error = %e, "failed to bind listener");
                self.notifier.notify("Server Error", &e.to_string());
                return Err(e.into());
            }
        };
        let local_addr = listener.local_addr();

        let cancel = CancellationToken::new();
        self.set_state(ServerState::Running);

        let accept = tokio::spawn(run_accept_loop(
            listener,
            self.hub.clone(),
            self.state_tx.subscribe(),
            cancel.clone(),
        ));
        let watcher = self.spawn_watcher(&cancel);

        *session = Some(Session {
            cancel,
            local_addr,
            accept,
            watcher,
        });

        info!(
            url = %format!("ws://{local_addr}{}", self.settings.ws_path),
            "sync server started"
        );
        Ok(LifecycleOutcome::Transitioned {
            from,
            to: ServerState::Running,
        })
    }

    /// Stop syncing without dropping peers.
    pub async fn pause(&self) -> LifecycleOutcome {
        let _session = self.session.lock().await;
        let from = self.state();
        if from != ServerState::Running {
            info!(state = %from, "server is not running");
            return LifecycleOutcome::NoOp { state: from };
        }

        self.set_state(ServerState::Paused);
        info!("pausing server and clipboard monitoring");
        self.notifier.notify("Paused", "Clipboard syncing paused");
        LifecycleOutcome::Transitioned {
            from,
            to: ServerState::Paused,
        }
    }

    /// Resume syncing with a fresh watcher.
    pub async fn resume(&self) -> LifecycleOutcome {
        let mut guard = self.session.lock().await;
        let from = self.state();
        let Some(session) = guard.as_mut().filter(|_| from == ServerState::Paused) else {
            info!(state = %from, "server is already running or not paused");
            return LifecycleOutcome::NoOp { state: from };
        };

        let replacement = self.spawn_watcher(&session.cancel);
        let previous = std::mem::replace(&mut session.watcher, replacement);
        previous.stop().await;

        self.set_state(ServerState::Running);
        info!("resuming clipboard monitoring");
        self.notifier.notify("Resumed", "Clipboard syncing resumed");
        LifecycleOutcome::Transitioned {
            from,
            to: ServerState::Running,
        }
    }

    /// Full teardown: watcher, accept loop, read loops, peers, socket.
    pub async fn exit(&self) -> LifecycleOutcome {
        let mut guard = self.session.lock().await;
        let from = self.state();
        let Some(session) = guard.take() else {
            return LifecycleOutcome::NoOp { state: from };
        };

        session.cancel.cancel();
        if let Err(e) = session.accept.await {
            error!(error = %e, "accept loop task failed");
        }
        session.watcher.stop().await;

        let closed = self.hub.registry().close_all().await;
        self.set_state(ServerState::Stopped);
        info!(closed, "sync server stopped");
        LifecycleOutcome::Transitioned {
            from,
            to: ServerState::Stopped,
        }
    }

    fn spawn_watcher(&self, session_cancel: &CancellationToken) -> WatcherTask {
        let cancel = session_cancel.child_token();
        let watcher = ClipboardWatcher::new(
            self.hub.clipboard().clone(),
            self.hub.clone(),
            self.settings.poll_interval,
            self.state_tx.subscribe(),
            cancel.clone(),
        );
        WatcherTask {
            cancel,
            join: watcher.spawn(),
        }
    }

    fn set_state(&self, state: ServerState) {
        let previous = self.state_tx.send_replace(state);
        info!(from = %previous, to = %state, "server state changed");
    }
}
