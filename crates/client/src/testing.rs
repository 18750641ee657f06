//! Test doubles shared by the interceptor and worker tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use pwa_offline_core::{Cache, Error, FetchRequest, Response};

use crate::fetch::Network;

/// In-memory network with scripted replies and a call counter.
///
/// Unknown URLs answer 404. While offline every call fails at the transport level.
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, (u16, &'static str)>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self { routes: Mutex::new(HashMap::new()), offline: AtomicBool::new(false), calls: AtomicUsize::new(0) }
    }

    pub fn route(&self, url: &str, status: u16, body: &'static str) {
        self.routes.lock().unwrap().insert(url.to_string(), (status, body));
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("network unreachable".into()));
        }

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .copied()
            .unwrap_or((404, "not found"));

        let mut response = Response::new(StatusCode::from_u16(status).unwrap(), body);
        response.url = Some(request.url.clone());
        Ok(response)
    }
}

/// Poll the store until an entry for `request` shows up.
///
/// Detached writes land some time after the response is delivered.
pub async fn wait_for_entry(cache: &Cache, request: &FetchRequest) -> Response {
    for _ in 0..200 {
        if let Some(hit) = cache.match_request(request).await.unwrap() {
            return hit;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no entry for {} in {}", request.url, cache.name());
}
