//! Request identity: the key a response is stored and looked up under.

use sha2::{Digest, Sha256};
use url::Url;

use crate::exchange::FetchRequest;

/// Compute the store key for a method and a fragment-free URL.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// The identity of a request within a store.
///
/// Two requests share an identity when they use the same method and the
/// same URL once the fragment is removed. Header-level matching (`Vary`) is
/// applied on top of this at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub method: String,
    pub url: String,
    pub key_hash: String,
}

impl RequestIdentity {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        let method = method.to_ascii_uppercase();
        let key_hash = compute_request_key(&method, url.as_str());
        Self { method, url: url.into(), key_hash }
    }

    pub fn of(request: &FetchRequest) -> Self {
        Self::new(request.method.as_str(), &request.url)
    }

    /// Only GET requests can be stored or matched.
    pub fn is_storable(&self) -> bool {
        self.method == "GET"
    }
}
