//! Client code for pwa-offline.
//!
//! This crate provides the network transport, the request interceptor with
//! its network-first and cache-first strategies, and the worker lifecycle
//! shared by the server and tests.

pub mod fetch;
pub mod intercept;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchConfig, HttpNetwork, Network, Scope};
pub use intercept::{Interception, Interceptor, Outcome, ResponseSource};
pub use worker::{ActivationReport, LifecycleState, MessageOutcome, Worker};
