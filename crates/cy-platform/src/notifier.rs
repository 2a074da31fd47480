//! Notification side channel.
//!
//! Desktop toasts are an external concern; this adapter reports every
//! notification as a structured `tracing` event under the `clipy::notify`
//! target so the console and log file both show them.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use cy_core::ports::NotifierPort;

pub struct TracingNotifier {
    enabled: AtomicBool,
}

impl TracingNotifier {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Toggle notifications. The confirmation is always emitted, even when
    /// turning them off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        let message = if enabled {
            "Notifications enabled"
        } else {
            "Notifications disabled"
        };
        emit("Notifications", message);
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NotifierPort for TracingNotifier {
    fn notify(&self, title: &str, message: &str) {
        if self.is_enabled() {
            emit(title, message);
        }
    }
}

fn emit(title: &str, message: &str) {
    info!(target: "clipy::notify", %title, %message, "notification");
}
