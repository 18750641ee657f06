//! Turning tool parameters into a page request.

use std::collections::BTreeMap;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use pwa_offline_client::Scope;
use pwa_offline_client::fetch::resolve;
use pwa_offline_core::{Error, FetchRequest, Response};

/// Build a request as the page would issue it. Relative URLs resolve against
/// the application origin.
pub fn build_request(
    scope: &Scope, url: &str, method: &str, headers: &BTreeMap<String, String>,
) -> Result<FetchRequest, Error> {
    let url = resolve(url, scope.base()).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| Error::InvalidInput(format!("invalid method: {method}")))?;

    let mut header_map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidInput(format!("invalid value for header {name}")))?;
        header_map.append(name, value);
    }

    Ok(FetchRequest { method, url, headers: header_map })
}

/// Response headers as name/value pairs, values decoded as UTF-8 (lossy).
pub fn header_pairs(response: &Response) -> Vec<(String, String)> {
    response
        .headers
        .iter()
        .map(|(name, value)| (name.to_string(), String::from_utf8_lossy(value.as_bytes()).to_string()))
        .collect()
}
