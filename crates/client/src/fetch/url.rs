//! URL resolution and the same-origin scope boundary.

use url::{Origin, Url};

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("origin must be http or https: {0}")]
    UnsupportedOrigin(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a URL as a page would: absolute URLs are taken as-is, anything
/// else is joined onto `base`.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `base`
/// 3. Remove fragment (#...)
/// 4. Keep query string intact (do not reorder)
pub fn resolve(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut resolved = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?
        }
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    resolved.set_fragment(None);

    Ok(resolved)
}

/// The set of requests this worker is responsible for: same-origin HTTP(S).
#[derive(Debug, Clone)]
pub struct Scope {
    base: Url,
    origin: Origin,
}

impl Scope {
    pub fn new(origin: &str) -> Result<Self, UrlError> {
        let base = Url::parse(origin.trim()).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.host().is_none() {
            return Err(UrlError::UnsupportedOrigin(origin.to_string()));
        }
        let origin = base.origin();
        Ok(Self { base, origin })
    }

    /// Base URL relative references are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Whether `url` is an HTTP(S) URL on the application's origin.
    pub fn contains(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https") && url.origin() == self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.example.com/").unwrap()
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve("https://cdn.example.net/lib.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.net/lib.js");
    }

    #[test]
    fn test_resolve_relative() {
        let url = resolve("/static/app.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/static/app.js");
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve("/index.html#section", &base()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve("/search?a=1&b=2", &base()).unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve("  /  ", &base()).unwrap();
        assert_eq!(url.as_str(), "https://app.example.com/");
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve("", &base()), Err(UrlError::Empty)));
        assert!(matches!(resolve("   ", &base()), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_keeps_other_schemes() {
        let url = resolve("data:text/plain,hello", &base()).unwrap();
        assert_eq!(url.scheme(), "data");
    }

    #[test]
    fn test_scope_same_origin() {
        let scope = Scope::new("https://app.example.com").unwrap();
        assert!(scope.contains(&Url::parse("https://app.example.com/app.js").unwrap()));
        assert!(scope.contains(&Url::parse("https://APP.example.com:443/").unwrap()));
    }

    #[test]
    fn test_scope_excludes_cross_origin() {
        let scope = Scope::new("https://app.example.com").unwrap();
        assert!(!scope.contains(&Url::parse("https://cdn.example.net/lib.js").unwrap()));
        assert!(!scope.contains(&Url::parse("http://app.example.com/app.js").unwrap()));
        assert!(!scope.contains(&Url::parse("https://app.example.com:8443/app.js").unwrap()));
    }

    #[test]
    fn test_scope_excludes_non_http() {
        let scope = Scope::new("https://app.example.com").unwrap();
        assert!(!scope.contains(&Url::parse("data:text/plain,hi").unwrap()));
        assert!(!scope.contains(&Url::parse("blob:https://app.example.com/1234").unwrap()));
        assert!(!scope.contains(&Url::parse("ws://app.example.com/socket").unwrap()));
    }

    #[test]
    fn test_scope_rejects_non_http_origin() {
        assert!(matches!(Scope::new("file:///srv/app"), Err(UrlError::UnsupportedOrigin(_))));
        assert!(Scope::new("").is_err());
    }
}
