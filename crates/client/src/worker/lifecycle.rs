//! Version transitions: install, skip-waiting, activate.
//!
//! Activation deletes every store whose name is not the current version's,
//! concurrently and with isolated failures, then claims all open clients.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::future::join_all;
use pwa_offline_core::{CacheDb, Error};
use serde::Serialize;
use tokio::sync::RwLock;

use super::clients::ClientRegistry;

/// Lifecycle states of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    /// Installed and waiting for activation.
    Installed,
    Activating,
    Activated,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Parsed => write!(f, "parsed"),
            LifecycleState::Installing => write!(f, "installing"),
            LifecycleState::Installed => write!(f, "installed"),
            LifecycleState::Activating => write!(f, "activating"),
            LifecycleState::Activated => write!(f, "activated"),
        }
    }
}

/// What an activation did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivationReport {
    /// Stale stores that are now gone.
    pub deleted: Vec<String>,
    /// Stale stores whose deletion failed, with the reason.
    pub failed: Vec<(String, String)>,
    /// Clients controlled after the claim.
    pub claimed: usize,
}

/// The named-store primitives the lifecycle needs.
#[async_trait]
pub trait StoreRegistry: Send + Sync {
    /// Create the store if it does not exist.
    async fn open_store(&self, name: &str) -> Result<(), Error>;

    async fn store_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a store. `Ok(false)` means it was already gone.
    async fn delete_store(&self, name: &str) -> Result<bool, Error>;
}

#[async_trait]
impl StoreRegistry for CacheDb {
    async fn open_store(&self, name: &str) -> Result<(), Error> {
        self.open_cache(name).await.map(|_| ())
    }

    async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.cache_names().await
    }

    async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        self.delete_cache(name).await
    }
}

/// Owns the state machine for one worker version.
pub struct LifecycleManager<R: StoreRegistry> {
    stores: R,
    cache_name: String,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
}

impl<R: StoreRegistry> LifecycleManager<R> {
    pub fn new(stores: R, cache_name: impl Into<String>) -> Self {
        Self {
            stores,
            cache_name: cache_name.into(),
            state: RwLock::new(LifecycleState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Request activation without waiting for older instances to go away.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn is_skip_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Move from `Parsed` to `Installed`, opening the version's store on the
    /// way. Installing twice is a no-op.
    pub async fn install(&self) -> LifecycleState {
        let mut state = self.state.write().await;
        if *state != LifecycleState::Parsed {
            return *state;
        }

        *state = LifecycleState::Installing;
        tracing::info!(store = %self.cache_name, "installing");
        if let Err(e) = self.stores.open_store(&self.cache_name).await {
            // the first write creates it instead
            tracing::warn!(store = %self.cache_name, error = %e, "could not open store during install");
        }

        *state = LifecycleState::Installed;
        *state
    }

    /// Delete stale stores, then claim every open client.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` unless the worker is installed and waiting.
    /// Failures while enumerating or deleting stores never fail activation.
    pub async fn activate(&self, clients: &ClientRegistry) -> Result<ActivationReport, Error> {
        {
            let mut state = self.state.write().await;
            if *state != LifecycleState::Installed {
                return Err(Error::Lifecycle(format!("cannot activate from state {}", *state)));
            }
            *state = LifecycleState::Activating;
        }
        tracing::info!(store = %self.cache_name, "activating");

        let names = match self.stores.store_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate stores, skipping cleanup");
                Vec::new()
            }
        };

        let stale: Vec<String> = names.into_iter().filter(|name| *name != self.cache_name).collect();
        let results = join_all(stale.iter().map(|name| async move {
            tracing::info!(store = %name, "deleting old store");
            (name.clone(), self.stores.delete_store(name).await)
        }))
        .await;

        let mut report = ActivationReport::default();
        for (name, result) in results {
            match result {
                Ok(_) => report.deleted.push(name),
                Err(e) => {
                    tracing::warn!(store = %name, error = %e, "failed to delete old store");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        *self.state.write().await = LifecycleState::Activated;

        tracing::info!("claiming all clients");
        report.claimed = clients.claim().await;

        tracing::info!(
            store = %self.cache_name,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            claimed = report.claimed,
            "activated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Registry where some names refuse to be deleted.
    struct FlakyRegistry {
        names: Mutex<BTreeSet<String>>,
        failing: BTreeSet<String>,
    }

    impl FlakyRegistry {
        fn new(names: &[&str], failing: &[&str]) -> Self {
            Self {
                names: Mutex::new(names.iter().map(|s| s.to_string()).collect()),
                failing: failing.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn remaining(&self) -> Vec<String> {
            self.names.lock().unwrap().iter().cloned().collect()
        }
    }

    #[async_trait]
    impl StoreRegistry for FlakyRegistry {
        async fn open_store(&self, name: &str) -> Result<(), Error> {
            self.names.lock().unwrap().insert(name.to_string());
            Ok(())
        }

        async fn store_names(&self) -> Result<Vec<String>, Error> {
            Ok(self.remaining())
        }

        async fn delete_store(&self, name: &str) -> Result<bool, Error> {
            if self.failing.contains(name) {
                return Err(Error::InvalidInput(format!("store {name} is locked")));
            }
            Ok(self.names.lock().unwrap().remove(name))
        }
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let manager = LifecycleManager::new(db, "pwa-cache-v2");
        assert_eq!(manager.state().await, LifecycleState::Parsed);

        assert_eq!(manager.install().await, LifecycleState::Installed);
        assert_eq!(manager.install().await, LifecycleState::Installed);

        manager.activate(&ClientRegistry::new()).await.unwrap();
        assert_eq!(manager.state().await, LifecycleState::Activated);
    }

    #[tokio::test]
    async fn test_install_opens_version_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let manager = LifecycleManager::new(db.clone(), "pwa-cache-v2");
        manager.install().await;
        assert!(db.has_cache("pwa-cache-v2").await.unwrap());
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let manager = LifecycleManager::new(db, "pwa-cache-v2");

        let result = manager.activate(&ClientRegistry::new()).await;
        assert!(matches!(result, Err(Error::Lifecycle(_))));
        assert_eq!(manager.state().await, LifecycleState::Parsed);
    }

    #[tokio::test]
    async fn test_activate_twice_fails() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let manager = LifecycleManager::new(db, "pwa-cache-v2");
        manager.install().await;
        manager.activate(&ClientRegistry::new()).await.unwrap();

        assert!(manager.activate(&ClientRegistry::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_activate_deletes_every_other_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_cache("pwa-cache-v1.0.1").await.unwrap();
        db.open_cache("pwa-cache-v1.0.2").await.unwrap();
        db.open_cache("unrelated").await.unwrap();
        db.open_cache("pwa-cache-v2").await.unwrap();

        let manager = LifecycleManager::new(db.clone(), "pwa-cache-v2");
        manager.install().await;
        let report = manager.activate(&ClientRegistry::new()).await.unwrap();

        assert_eq!(report.deleted.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(db.cache_names().await.unwrap(), vec!["pwa-cache-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_deletion_failure_is_isolated() {
        let registry = FlakyRegistry::new(&["v1", "v2", "v3", "current"], &["v2"]);
        let manager = LifecycleManager::new(registry, "current");
        let clients = ClientRegistry::new();
        clients.observe("tab-1", false).await;
        manager.install().await;

        let report = manager.activate(&clients).await.unwrap();

        assert_eq!(report.deleted, vec!["v1".to_string(), "v3".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "v2");
        assert_eq!(report.claimed, 1);
        assert_eq!(manager.state().await, LifecycleState::Activated);
        assert_eq!(manager.stores.remaining(), vec!["current".to_string(), "v2".to_string()]);
    }

    #[test]
    fn test_skip_waiting_flag() {
        let registry = FlakyRegistry::new(&[], &[]);
        let manager = LifecycleManager::new(registry, "current");
        assert!(!manager.is_skip_waiting());
        manager.skip_waiting();
        assert!(manager.is_skip_waiting());
    }
}
