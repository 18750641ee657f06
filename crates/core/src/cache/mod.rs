//! SQLite-backed versioned response stores.
//!
//! This module provides named key-value stores of captured responses using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - One logical store per version-qualified name
//! - Request identity keyed by SHA-256 of method and URL
//! - `Vary`-aware matching
//! - Whole-store deletion during version cleanup
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{Cache, StoredResponse};
pub use hash::RequestIdentity;
