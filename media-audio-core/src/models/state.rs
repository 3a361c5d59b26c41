/// Endpoint (source/sink controller) state machine.
///
/// State transitions:
/// ```text
/// closed ──start()──→ paused ──resume()──→ running
///   ↑                   ↑ ←────pause()────── │
///   └──────────── close() / device fault ────┘
/// ```
/// `start()` only leaves `Closed` when a device session is open, and moves
/// straight on to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointState {
    #[default]
    Closed,
    Paused,
    Running,
}

impl EndpointState {
    pub fn is_started(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Device session state machine.
///
/// ```text
/// closed → open(paused) ⇄ open(running) → closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Paused,
    Running,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}
