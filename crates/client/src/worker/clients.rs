//! Open page instances and whether this worker controls them.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Tracks page instances by opaque client id.
///
/// A page first seen while the worker is active is controlled from the
/// start. Pages seen earlier stay uncontrolled until [`ClientRegistry::claim`].
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, bool>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a client and return whether it is controlled.
    pub async fn observe(&self, id: &str, worker_active: bool) -> bool {
        if let Some(controlled) = self.clients.read().await.get(id) {
            return *controlled;
        }
        *self.clients.write().await.entry(id.to_string()).or_insert(worker_active)
    }

    /// Take control of every known client. Returns the number controlled.
    pub async fn claim(&self) -> usize {
        let mut clients = self.clients.write().await;
        clients.values_mut().for_each(|controlled| *controlled = true);
        clients.len()
    }

    /// Drop a page that has closed. Returns whether it was known.
    ///
    /// Ids are supplied by the host, which must forget closed pages to keep
    /// the registry bounded.
    pub async fn forget(&self, id: &str) -> bool {
        self.clients.write().await.remove(id).is_some()
    }

    pub async fn is_controlled(&self, id: &str) -> Option<bool> {
        self.clients.read().await.get(id).copied()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }
}
