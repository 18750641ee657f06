//! The terminal fallback page served when neither network nor store can answer.

use http::{HeaderValue, StatusCode, header};

use crate::exchange::Response;

/// Self-contained offline page. No external stylesheets, scripts, fonts or images.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Offline</title>
<style>
  body { margin: 0; min-height: 100vh; display: flex; align-items: center; justify-content: center;
         font-family: system-ui, sans-serif; background: #f4f4f5; color: #27272a; }
  main { max-width: 26rem; padding: 2.5rem; text-align: center; background: #fff;
         border-radius: 0.75rem; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.08); }
  h1 { margin: 0 0 1rem; font-size: 1.5rem; color: #c2410c; }
  p { margin: 0.5rem 0; line-height: 1.5; }
  button { margin-top: 1.5rem; padding: 0.75rem 1.5rem; border: 0; border-radius: 0.375rem;
           background: #2563eb; color: #fff; font-size: 1rem; cursor: pointer; }
</style>
</head>
<body>
<main>
  <h1>You're offline</h1>
  <p>This page has not been saved for offline use yet.</p>
  <p>Reconnect to the internet and open this page once; after that it will be available offline.</p>
  <button type="button" onclick="location.reload()">Try again</button>
</main>
</body>
</html>
"#;

/// Build a fresh fallback response: `503 Service Unavailable`, `text/html`.
///
/// The response has no URL and is never written to a store.
pub fn offline_response() -> Response {
    let mut response = Response::new(StatusCode::SERVICE_UNAVAILABLE, OFFLINE_PAGE);
    response
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
