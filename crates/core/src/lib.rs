//! Core types and shared functionality for pwa-offline.
//!
//! This crate provides:
//! - Versioned response stores with a SQLite backend
//! - Request/response value types
//! - The freshness strategy selector and the offline fallback page
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod exchange;
pub mod offline;
pub mod strategy;

pub use cache::{Cache, CacheDb, RequestIdentity, StoredResponse};
pub use config::AppConfig;
pub use error::Error;
pub use exchange::{FetchRequest, Response};
pub use offline::offline_response;
pub use strategy::{Strategy, StrategySelector};
