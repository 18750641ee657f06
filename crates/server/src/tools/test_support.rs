//! Fixtures for tool tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::{HeaderValue, StatusCode, header};
use pwa_offline_client::{Network, Worker};
use pwa_offline_core::{AppConfig, CacheDb, Error, FetchRequest, Response};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;

/// Network answering 200 with the same body for every URL, unless offline.
pub struct FixedNetwork {
    body: &'static str,
    offline: AtomicBool,
}

impl FixedNetwork {
    pub fn online(body: &'static str) -> Self {
        Self { body, offline: AtomicBool::new(false) }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Network for FixedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<Response, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network("offline".into()));
        }
        let mut response = Response::new(StatusCode::OK, self.body);
        response.url = Some(request.url.clone());
        response
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        Ok(response)
    }
}

fn test_config(skip_waiting: bool) -> AppConfig {
    AppConfig {
        origin: "https://app.example.com".into(),
        skip_waiting_on_install: skip_waiting,
        ..Default::default()
    }
}

async fn build(network: FixedNetwork, skip_waiting: bool) -> (Worker<FixedNetwork>, Arc<FixedNetwork>, CacheDb) {
    let network = Arc::new(network);
    let db = CacheDb::open_in_memory().await.unwrap();
    let worker = Worker::new(Arc::clone(&network), db.clone(), &test_config(skip_waiting)).unwrap();
    worker.start().await.unwrap();
    (worker, network, db)
}

/// An activated worker over an in-memory database.
pub async fn worker_with(network: FixedNetwork) -> (Worker<FixedNetwork>, Arc<FixedNetwork>, CacheDb) {
    build(network, true).await
}

/// An installed worker still waiting for SKIP_WAITING.
pub async fn waiting_worker_with(network: FixedNetwork) -> (Worker<FixedNetwork>, Arc<FixedNetwork>, CacheDb) {
    build(network, false).await
}

pub fn text_of(result: &CallToolResult) -> String {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content")
        .to_string()
}

pub fn output_of<T: DeserializeOwned>(result: CallToolResult) -> T {
    serde_json::from_str(&text_of(&result)).unwrap()
}
