//! Start / pause / resume / exit behaviour of the lifecycle controller.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use cy_app::{LifecycleController, LifecycleDeps, LifecycleError, LifecycleSettings};
use cy_core::{BindError, ClipboardSnapshot, LifecycleOutcome, ServerState};

use common::{hub, Fixture, MemoryTransport, WAIT};

const POLL: Duration = Duration::from_millis(20);

struct Harness {
    controller: LifecycleController,
    transport: MemoryTransport,
    fx: Fixture,
    addr: SocketAddr,
}

fn harness() -> Harness {
    common::init_tracing();
    let fx = hub();
    let transport = MemoryTransport::default();
    let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
    let controller = LifecycleController::from_deps(LifecycleDeps {
        hub: fx.hub.clone(),
        transport: Arc::new(transport.clone()),
        notifier: fx.notifier.clone(),
        settings: LifecycleSettings {
            bind_addr: addr,
            ws_path: "/ws".to_string(),
            poll_interval: POLL,
        },
    });
    Harness {
        controller,
        transport,
        fx,
        addr,
    }
}

impl Harness {
    async fn wait_for_peers(&self, expected: usize) {
        let mut peers = self.controller.subscribe_peers();
        tokio::time::timeout(WAIT, peers.wait_for(|n| *n == expected))
            .await
            .expect("peer count never reached")
            .unwrap();
    }

    async fn connect(&self, id: &str) -> common::MemoryPeer {
        let before = self.controller.status().await.peers;
        let peer = self.transport.connect(self.addr, id).expect("listener bound");
        self.wait_for_peers(before + 1).await;
        peer
    }
}

async fn settle() {
    tokio::time::sleep(POLL * 5).await;
}

#[tokio::test]
async fn start_binds_and_reports_connect_url() {
    let h = harness();
    assert_eq!(h.controller.state(), ServerState::Stopped);

    let outcome = h.controller.start().await.unwrap();

    assert_eq!(
        outcome,
        LifecycleOutcome::Transitioned {
            from: ServerState::Stopped,
            to: ServerState::Running,
        }
    );
    assert!(h.transport.is_bound(h.addr));
    assert_eq!(
        h.controller.connect_url().await.as_deref(),
        Some("ws://127.0.0.1:8080/ws")
    );
    h.controller.exit().await;
}

#[tokio::test]
async fn second_start_is_a_no_op() {
    let h = harness();
    h.controller.start().await.unwrap();

    let outcome = h.controller.start().await.unwrap();

    assert_eq!(
        outcome,
        LifecycleOutcome::NoOp {
            state: ServerState::Running
        }
    );
    assert!(h.fx.notifier.contains("Running"));
    h.controller.exit().await;
}

#[tokio::test]
async fn bind_failure_leaves_server_stopped() {
    let h = harness();
    h.transport.occupy(h.addr);

    let err = h.controller.start().await.unwrap_err();

    assert!(matches!(err, LifecycleError::Bind(BindError::AddrInUse(a)) if a == h.addr));
    assert_eq!(h.controller.state(), ServerState::Stopped);
    assert_eq!(h.controller.connect_url().await, None);
    assert!(h.fx.notifier.contains("Server Error"));
}

#[tokio::test]
async fn calls_that_do_not_apply_are_no_ops() {
    let h = harness();

    assert!(!h.controller.pause().await.changed());
    assert!(!h.controller.resume().await.changed());
    assert!(!h.controller.exit().await.changed());

    h.controller.start().await.unwrap();
    assert!(!h.controller.resume().await.changed());
    h.controller.pause().await;
    assert_eq!(
        h.controller.pause().await,
        LifecycleOutcome::NoOp {
            state: ServerState::Paused
        }
    );
    h.controller.exit().await;
}

#[tokio::test]
async fn existing_clipboard_content_is_not_broadcast_on_start() {
    let h = harness();
    h.fx.clipboard.copy_text("before start");
    h.controller.start().await.unwrap();
    let mut peer = h.connect("a").await;

    settle().await;

    assert!(peer.drain().is_empty());
    h.controller.exit().await;
}

#[tokio::test]
async fn local_copy_is_pushed_to_connected_peers() {
    let h = harness();
    h.controller.start().await.unwrap();
    let mut a = h.connect("a").await;
    let mut b = h.connect("b").await;

    h.fx.clipboard.copy_text("hello");

    assert_eq!(a.next().await.as_deref(), Some("text:hello"));
    assert_eq!(b.next().await.as_deref(), Some("text:hello"));
    h.controller.exit().await;
}

#[tokio::test]
async fn peer_update_is_applied_and_forwarded() {
    let h = harness();
    h.controller.start().await.unwrap();
    let mut a = h.connect("a").await;
    let mut b = h.connect("b").await;

    a.send("text:from phone");

    assert_eq!(b.next().await.as_deref(), Some("text:from phone"));
    assert_eq!(
        h.fx.clipboard.current(),
        Some(ClipboardSnapshot::text("from phone"))
    );
    // The watcher sees the written content but must not echo it.
    settle().await;
    assert!(a.drain().is_empty());
    assert!(b.drain().is_empty());
    h.controller.exit().await;
}

#[tokio::test]
async fn pause_then_resume_does_not_echo() {
    let h = harness();
    h.fx.clipboard.copy_text("at pause time");
    h.controller.start().await.unwrap();
    let mut peer = h.connect("a").await;

    h.controller.pause().await;
    h.fx.clipboard.copy_text("copied while paused");
    settle().await;
    assert!(peer.drain().is_empty());

    let outcome = h.controller.resume().await;
    assert!(outcome.changed());
    settle().await;
    assert!(peer.drain().is_empty());

    h.fx.clipboard.copy_text("after resume");
    assert_eq!(peer.next().await.as_deref(), Some("text:after resume"));
    assert!(h.fx.notifier.contains("Paused"));
    assert!(h.fx.notifier.contains("Resumed"));
    h.controller.exit().await;
}

#[tokio::test]
async fn inbound_messages_wait_while_paused() {
    let h = harness();
    h.controller.start().await.unwrap();
    let a = h.connect("a").await;
    let mut b = h.connect("b").await;

    h.controller.pause().await;
    a.send("text:sent during pause");
    settle().await;

    assert!(h.fx.clipboard.writes().is_empty());
    assert!(b.drain().is_empty());
    assert_eq!(h.controller.status().await.peers, 2);

    h.controller.resume().await;
    assert_eq!(b.next().await.as_deref(), Some("text:sent during pause"));
    h.controller.exit().await;
}

#[tokio::test]
async fn peer_hang_up_is_deregistered() {
    let h = harness();
    h.controller.start().await.unwrap();
    let mut a = h.connect("a").await;
    let _b = h.connect("b").await;

    a.hang_up();
    h.wait_for_peers(1).await;

    assert!(h.fx.notifier.contains("Device Disconnected"));
    h.controller.exit().await;
}

#[tokio::test]
async fn exit_closes_peers_and_releases_listener() {
    let h = harness();
    h.controller.start().await.unwrap();
    let mut a = h.connect("a").await;
    let mut b = h.connect("b").await;
    h.controller.pause().await;

    let outcome = h.controller.exit().await;

    assert_eq!(
        outcome,
        LifecycleOutcome::Transitioned {
            from: ServerState::Paused,
            to: ServerState::Stopped,
        }
    );
    assert!(a.is_closed().await);
    assert!(b.is_closed().await);
    assert_eq!(h.controller.status().await.peers, 0);
    assert!(!h.transport.is_bound(h.addr));

    // The port is free again.
    assert!(h.controller.start().await.unwrap().changed());
    h.controller.exit().await;
}

#[tokio::test]
async fn state_changes_are_observable() {
    let h = harness();
    let mut states = h.controller.subscribe_state();

    h.controller.start().await.unwrap();
    assert_eq!(*states.borrow_and_update(), ServerState::Running);
    h.controller.pause().await;
    assert_eq!(*states.borrow_and_update(), ServerState::Paused);
    h.controller.exit().await;
    assert_eq!(*states.borrow_and_update(), ServerState::Stopped);
}
