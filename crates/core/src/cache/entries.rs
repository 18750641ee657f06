//! Per-store entries: match, put (replace), enumerate.
//!
//! A stored response is an immutable snapshot of a live response. Writes
//! replace the whole entry under the same identity in one statement, so a
//! concurrent lookup sees either the old snapshot or the new one.

use super::connection::CacheDb;
use super::hash::RequestIdentity;
use crate::Error;
use crate::exchange::{FetchRequest, Response};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A response snapshot as persisted in a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    pub key_hash: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    /// Header values as raw bytes; they need not be UTF-8.
    pub headers: Vec<(String, Vec<u8>)>,
    /// Request header values recorded for each name in the response's `Vary`.
    pub vary: Option<Vec<(String, Option<Vec<u8>>)>>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl StoredResponse {
    /// Capture `response` as the entry for `request`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedMethod` unless the request is a GET
    /// - `InvalidInput` if the response varies on `*`
    pub fn capture(request: &FetchRequest, response: &Response) -> Result<Self, Error> {
        let identity = RequestIdentity::of(request);
        if !identity.is_storable() {
            return Err(Error::UnsupportedMethod(format!("cannot store {} {}", identity.method, identity.url)));
        }

        let vary_names = vary_header_names(&response.headers);
        if vary_names.iter().any(|name| name == "*") {
            return Err(Error::InvalidInput(format!("response for {} varies on '*'", identity.url)));
        }

        let vary = if vary_names.is_empty() {
            None
        } else {
            Some(
                vary_names
                    .into_iter()
                    .map(|name| {
                        let value = header_value(&request.headers, &name);
                        (name, value)
                    })
                    .collect(),
            )
        };

        let headers = response
            .headers
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
            .collect();

        Ok(Self {
            key_hash: identity.key_hash,
            method: identity.method,
            url: identity.url,
            status: response.status.as_u16(),
            headers,
            vary,
            body: response.body.to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Whether the request headers agree with the values recorded at write time.
    pub fn matches_vary(&self, request: &FetchRequest) -> bool {
        match &self.vary {
            None => true,
            Some(recorded) => recorded
                .iter()
                .all(|(name, value)| header_value(&request.headers, name) == *value),
        }
    }

    /// Rebuild a deliverable response from the snapshot.
    pub fn into_response(self) -> Result<Response, Error> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|e| Error::InvalidInput(format!("stored status {}: {e}", self.status)))?;

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_bytes(value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(url = %self.url, header = %name, "dropping unreadable stored header"),
            }
        }

        Ok(Response { url: url::Url::parse(&self.url).ok(), status, headers, body: Bytes::from(self.body) })
    }
}

fn vary_header_names(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<Vec<u8>> {
    headers.get(name).map(|v| v.as_bytes().to_vec())
}

/// A single named store.
#[derive(Clone, Debug)]
pub struct Cache {
    db: CacheDb,
    name: String,
}

impl Cache {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored snapshot for `request`.
    ///
    /// Returns None for non-GET requests, for unknown identities and when a
    /// recorded `Vary` header does not match.
    pub async fn match_stored(&self, request: &FetchRequest) -> Result<Option<StoredResponse>, Error> {
        let identity = RequestIdentity::of(request);
        if !identity.is_storable() {
            return Ok(None);
        }

        let store = self.name.clone();
        let stored = self
            .db
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, method, url, status, headers_json, vary_json, body, stored_at
                     FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, identity.key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u16>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Vec<u8>>(6)?,
                        row.get::<_, String>(7)?,
                    ))
                });

                let (key_hash, method, url, status, headers_json, vary_json, body, stored_at) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let vary = vary_json.map(|json| serde_json::from_str(&json)).transpose()?;

                Ok(Some(StoredResponse {
                    key_hash,
                    method,
                    url,
                    status,
                    headers: serde_json::from_str(&headers_json)?,
                    vary,
                    body,
                    stored_at,
                }))
            })
            .await
            .map_err(Error::from)?;

        Ok(stored.filter(|s| s.matches_vary(request)))
    }

    /// Look up the response stored for `request`.
    pub async fn match_request(&self, request: &FetchRequest) -> Result<Option<Response>, Error> {
        self.match_stored(request)
            .await?
            .map(StoredResponse::into_response)
            .transpose()
    }

    /// Store `response` for `request`, replacing any previous entry.
    ///
    /// Creates the store if it does not exist yet.
    pub async fn put(&self, request: &FetchRequest, response: &Response) -> Result<(), Error> {
        let entry = StoredResponse::capture(request, response)?;
        let headers_json = serde_json::to_string(&entry.headers)?;
        let vary_json = entry.vary.as_ref().map(serde_json::to_string).transpose()?;
        let store = self.name.clone();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![store, entry.stored_at],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                        store_name, key_hash, method, url, status, headers_json, vary_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(store_name, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        vary_json = excluded.vary_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        store,
                        entry.key_hash,
                        entry.method,
                        entry.url,
                        entry.status,
                        headers_json,
                        vary_json,
                        entry.body,
                        entry.stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// URLs of every entry in the store, oldest write first.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT url FROM entries WHERE store_name = ?1 ORDER BY stored_at ASC, rowid ASC")?;
                let urls = stmt
                    .query_map(params![store], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries in the store.
    pub async fn len(&self) -> Result<u64, Error> {
        let store = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE store_name = ?1", params![store], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
