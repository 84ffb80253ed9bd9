//! The server's start/stop/kill state machine, shared between the accept loop and the
//! manager control endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Manager-visible lifecycle state. `Terminated` is a dead end: once killed, a
/// `Server` never accepts again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Running,
    Terminated,
}

impl ServerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServerStatus::Stopped => "STOPPED",
            ServerStatus::Running => "RUNNING",
            ServerStatus::Terminated => "TERMINATED",
        }
    }
}

/// Shared handle the manager endpoint uses to drive the accept loop's lifecycle.
/// Cloning shares the same underlying state.
#[derive(Clone)]
pub struct ServerControl {
    status: Arc<Mutex<ServerStatus>>,
    accepting: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Default for ServerControl {
    fn default() -> Self {
        ServerControl {
            status: Arc::new(Mutex::new(ServerStatus::Stopped)),
            accepting: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }
}

impl ServerControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status(&self) -> ServerStatus {
        *self.status.lock().await
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Resolves once `stop`/`kill` flips accepting off, or immediately if already off.
    pub async fn wait_for_stop_signal(&self) {
        self.wake.notified().await;
    }

    /// Idempotent: `START` on an already-running server just reports `RUNNING` again.
    pub async fn start(&self) -> ServerStatus {
        let mut status = self.status.lock().await;
        if *status != ServerStatus::Terminated {
            *status = ServerStatus::Running;
            self.accepting.store(true, Ordering::SeqCst);
            self.wake.notify_waiters();
        }
        *status
    }

    /// Idempotent: refuses new accepts. Existing sessions are left to the caller to
    /// drain (the manager endpoint awaits the registry separately).
    pub async fn stop(&self) -> ServerStatus {
        let mut status = self.status.lock().await;
        if *status != ServerStatus::Terminated {
            *status = ServerStatus::Stopped;
            self.accepting.store(false, Ordering::SeqCst);
            self.wake.notify_waiters();
        }
        *status
    }

    /// Terminal: refuses new accepts forever. Killing existing sessions is the caller's
    /// job (via the session registry).
    pub async fn kill(&self) -> ServerStatus {
        let mut status = self.status.lock().await;
        *status = ServerStatus::Terminated;
        self.accepting.store(false, Ordering::SeqCst);
        self.wake.notify_waiters();
        *status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_transitions_follow_the_lifecycle() {
        let control = ServerControl::new();
        assert_eq!(control.status().await, ServerStatus::Stopped);
        assert_eq!(control.start().await, ServerStatus::Running);
        assert_eq!(control.stop().await, ServerStatus::Stopped);
        assert_eq!(control.kill().await, ServerStatus::Terminated);
        assert_eq!(control.start().await, ServerStatus::Terminated);
    }

    #[tokio::test]
    async fn stop_and_start_are_idempotent() {
        let control = ServerControl::new();
        control.start().await;
        assert_eq!(control.start().await, ServerStatus::Running);
        control.stop().await;
        assert_eq!(control.stop().await, ServerStatus::Stopped);
    }
}
