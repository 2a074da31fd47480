//! Server lifecycle states and transition outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide sync server state.
///
/// 同步服务器状态：Stopped → Running ⇄ Paused。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServerState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl ServerState {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stopped => "Stopped",
            Self::Running => "Running",
            Self::Paused => "Paused",
        };
        f.write_str(label)
    }
}

/// Result of a lifecycle API call that did not fail.
///
/// Failures (bind errors) are reported through `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The transition happened.
    Transitioned { from: ServerState, to: ServerState },
    /// The controller was already in the requested state, or the call is
    /// not applicable in the current state. Nothing changed.
    NoOp { state: ServerState },
}

impl LifecycleOutcome {
    pub fn changed(self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }

    pub fn state(self) -> ServerState {
        match self {
            Self::Transitioned { to, .. } => to,
            Self::NoOp { state } => state,
        }
    }
}
