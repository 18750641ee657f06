//! The worker facade the host runtime drives.
//!
//! Hosts call [`Worker::on_install`], [`Worker::on_activate`],
//! [`Worker::on_message`] and [`Worker::handle`]; [`Worker::start`] runs the
//! usual install-then-activate sequence for a fresh deployment.

pub mod clients;
pub mod lifecycle;
pub mod message;

use std::sync::Arc;

use pwa_offline_core::{AppConfig, CacheDb, Error, FetchRequest};
use serde::Serialize;

pub use clients::ClientRegistry;
pub use lifecycle::{ActivationReport, LifecycleManager, LifecycleState, StoreRegistry};
pub use message::ControlMessage;

use crate::fetch::{Network, Scope};
use crate::intercept::{Interception, Interceptor, Outcome};

/// What happened to a posted control message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MessageOutcome {
    /// Not a recognized command.
    Ignored,
    /// Skip-waiting recorded; `activation` is set when it activated the worker.
    Accepted { activation: Option<ActivationReport> },
}

/// One deployed version of the request-interception worker.
pub struct Worker<N: Network> {
    interceptor: Arc<Interceptor<N>>,
    lifecycle: LifecycleManager<CacheDb>,
    clients: ClientRegistry,
    skip_waiting_on_install: bool,
}

impl<N: Network + 'static> Worker<N> {
    pub fn new(network: Arc<N>, db: CacheDb, config: &AppConfig) -> Result<Self, Error> {
        let interceptor = Interceptor::from_config(network, db.clone(), config)?;
        Ok(Self {
            lifecycle: LifecycleManager::new(db, interceptor.cache_name()),
            interceptor: Arc::new(interceptor),
            clients: ClientRegistry::new(),
            skip_waiting_on_install: config.skip_waiting_on_install,
        })
    }

    /// Name of the store this version owns.
    pub fn cache_name(&self) -> &str {
        self.lifecycle.cache_name()
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    /// The origin boundary; page URLs resolve against its base.
    pub fn scope(&self) -> &Scope {
        self.interceptor.scope()
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    pub async fn on_install(&self) -> LifecycleState {
        let state = self.lifecycle.install().await;
        if self.skip_waiting_on_install {
            tracing::info!("skip waiting requested at install");
            self.lifecycle.skip_waiting();
        }
        state
    }

    pub async fn on_activate(&self) -> Result<ActivationReport, Error> {
        self.lifecycle.activate(&self.clients).await
    }

    /// Install, then activate right away if skip-waiting has been requested.
    ///
    /// Returns `None` when the worker is left waiting for a control message.
    pub async fn start(&self) -> Result<Option<ActivationReport>, Error> {
        self.on_install().await;
        if !self.lifecycle.is_skip_waiting() {
            tracing::info!(store = self.cache_name(), "installed, waiting for SKIP_WAITING");
            return Ok(None);
        }
        self.on_activate().await.map(Some)
    }

    /// Handle a control message from a page.
    pub async fn on_message(&self, message: &serde_json::Value) -> Result<MessageOutcome, Error> {
        match ControlMessage::parse(message) {
            None => {
                tracing::debug!("ignoring unrecognized message {}", message);
                Ok(MessageOutcome::Ignored)
            }
            Some(ControlMessage::SkipWaiting) => {
                self.lifecycle.skip_waiting();
                if self.state().await != LifecycleState::Installed {
                    return Ok(MessageOutcome::Accepted { activation: None });
                }
                match self.on_activate().await {
                    Ok(report) => Ok(MessageOutcome::Accepted { activation: Some(report) }),
                    // a concurrent message got there first
                    Err(Error::Lifecycle(reason)) => {
                        tracing::debug!(%reason, "activation already under way");
                        Ok(MessageOutcome::Accepted { activation: None })
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    /// Handle a request issued by the page `client_id`.
    ///
    /// Requests pass through until the worker is activated and controls the
    /// issuing page. Once a strategy starts it runs on its own task to
    /// completion even if the caller stops waiting.
    pub async fn handle(&self, client_id: Option<&str>, request: FetchRequest) -> Interception {
        let active = self.state().await == LifecycleState::Activated;
        let controlled = match client_id {
            Some(id) => self.clients.observe(id, active).await,
            None => active,
        };
        if !active || !controlled {
            return Interception::Passthrough;
        }

        let strategy = self.interceptor.classify(&request);
        let interceptor = Arc::clone(&self.interceptor);
        match tokio::spawn(async move { interceptor.respond(request).await }).await {
            Ok(interception) => interception,
            Err(e) => {
                tracing::error!(error = %e, %strategy, "request task failed");
                Interception::Respond(Outcome::fallback(strategy))
            }
        }
    }
}
