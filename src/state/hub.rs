//! Hub: the process-wide shared state handed to every task.

use crate::db::Store;
use crate::state::registry::{ConnId, ConnIdGen, Registry};
use tokio::sync::broadcast;

/// Shared server state: the persistence store, the session registry and
/// the shutdown signal.
pub struct Hub {
    pub store: Store,
    pub registry: Registry,
    shutdown_tx: broadcast::Sender<()>,
    conn_ids: ConnIdGen,
}

impl Hub {
    pub fn new(store: Store) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store,
            registry: Registry::new(),
            shutdown_tx,
            conn_ids: ConnIdGen::default(),
        }
    }

    /// Allocate an id for a freshly accepted connection.
    pub fn next_conn_id(&self) -> ConnId {
        self.conn_ids.next()
    }

    /// Subscribe to the shutdown signal.
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Ask the accept loop to stop. Already-connected sessions run until
    /// their own EOF or until the process exits.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
