//! The live set of connected sessions, keyed by peer address, so the manager's
//! `CONNECTIONS`/`STOP`/`KILL` commands have something to act on.

use crate::server::chancomms::InternalMsg;
use chrono::{DateTime, Utc};
use futures::channel::mpsc::Sender;
use futures::SinkExt;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A snapshot of one connected session, cheap to clone for `CONNECTIONS` replies.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub id: u64,
    pub peer_addr: SocketAddr,
    pub username: Option<String>,
    pub cwd: String,
    pub connected_at: DateTime<Utc>,
    pub control_msg_tx: Sender<InternalMsg>,
}

/// Registry of every currently-connected control channel, guarded by a single mutex.
/// Pure bookkeeping; never consulted on the data path.
#[derive(Default, Clone)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<SocketAddr, ConnectionInfo>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Adds `peer_addr` to the live set, returning its freshly-assigned session id.
    pub async fn register(&self, peer_addr: SocketAddr, control_msg_tx: Sender<InternalMsg>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut map = self.inner.lock().await;
        map.insert(
            peer_addr,
            ConnectionInfo {
                id,
                peer_addr,
                username: None,
                cwd: "/".to_string(),
                connected_at: Utc::now(),
                control_msg_tx,
            },
        );
        id
    }

    pub async fn set_username(&self, peer_addr: SocketAddr, username: String) {
        let mut map = self.inner.lock().await;
        if let Some(info) = map.get_mut(&peer_addr) {
            info.username = Some(username);
        }
    }

    pub async fn set_cwd(&self, peer_addr: SocketAddr, cwd: String) {
        let mut map = self.inner.lock().await;
        if let Some(info) = map.get_mut(&peer_addr) {
            info.cwd = cwd;
        }
    }

    pub async fn unregister(&self, peer_addr: SocketAddr) {
        let mut map = self.inner.lock().await;
        map.remove(&peer_addr);
    }

    pub async fn snapshot(&self) -> Vec<ConnectionInfo> {
        self.inner.lock().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Used by the manager's `KILL` command: sends `Quit` to every registered session
    /// and clears the registry immediately, without waiting for transfers to drain.
    pub async fn kill_all(&self) {
        let mut map = self.inner.lock().await;
        for (_, info) in map.iter_mut() {
            let _ = info.control_msg_tx.send(InternalMsg::Quit).await;
        }
        map.clear();
    }
}
