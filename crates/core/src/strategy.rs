//! Freshness policy: which requests prefer the network and which prefer a store.
//!
//! Classification is a pure function of the request path, evaluated as an
//! ordered list of predicates where the first match wins.

use serde::{Deserialize, Serialize};

/// How a request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Live fetch first, then the store, then the offline page.
    NetworkFirst,
    /// Store first; fetch and store only on a miss.
    CacheFirst,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::NetworkFirst => write!(f, "network-first"),
            Strategy::CacheFirst => write!(f, "cache-first"),
        }
    }
}

/// A single path predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRule {
    /// Path ends with the given suffix (e.g. `.js`).
    Suffix(String),
    /// Path equals the given value exactly (e.g. `/`).
    Exact(String),
    /// Path contains the given substring anywhere.
    Contains(String),
}

impl PathRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            PathRule::Suffix(suffix) => path.ends_with(suffix.as_str()),
            PathRule::Exact(value) => path == value,
            PathRule::Contains(needle) => path.contains(needle.as_str()),
        }
    }
}

/// Maps a request path onto a [`Strategy`].
///
/// Any path matching one of the rules is `NetworkFirst`; everything else is
/// `CacheFirst`.
#[derive(Debug, Clone)]
pub struct StrategySelector {
    network_first: Vec<PathRule>,
}

impl StrategySelector {
    /// Build the selector from network-first suffixes and the application marker.
    ///
    /// Rule order: suffixes as given, then the root path, then the marker.
    /// An empty marker is skipped since it would match every path.
    pub fn new<S: AsRef<str>>(suffixes: &[S], app_marker: &str) -> Self {
        let mut network_first: Vec<PathRule> =
            suffixes.iter().map(|s| PathRule::Suffix(s.as_ref().to_string())).collect();
        network_first.push(PathRule::Exact("/".into()));
        if !app_marker.is_empty() {
            network_first.push(PathRule::Contains(app_marker.to_string()));
        }
        Self { network_first }
    }

    pub fn from_rules(network_first: Vec<PathRule>) -> Self {
        Self { network_first }
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.network_first
    }

    pub fn classify(&self, path: &str) -> Strategy {
        if self.network_first.iter().any(|rule| rule.matches(path)) {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }
}
