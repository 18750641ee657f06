//! MCP tool implementations.
//!
//! This module contains all tools exposed by the pwa-offline server.

pub mod cache;
pub mod request;
pub mod sw_fetch;
pub mod sw_message;
pub mod sw_status;

pub use sw_fetch::{SwFetchParams, fetch_impl};
pub use sw_message::{SwMessageParams, message_impl};
pub use sw_status::status_impl;

#[cfg(test)]
pub(crate) mod test_support;
