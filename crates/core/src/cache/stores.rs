//! Named store management: open, enumerate, delete.

use super::connection::CacheDb;
use super::entries::Cache;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Handle to the store called `name` without touching the database.
    ///
    /// Lookups against a store that does not exist yet miss; the first write
    /// creates it.
    pub fn cache(&self, name: &str) -> Cache {
        Cache::new(self.clone(), name)
    }

    /// Open the store called `name`, creating it if absent.
    pub async fn open_cache(&self, name: &str) -> Result<Cache, Error> {
        let owned = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![owned, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;
        Ok(self.cache(name))
    }

    /// Whether a store called `name` exists.
    pub async fn has_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM stores WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of every existing store, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY created_at ASC, rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns `false` if no such store existed. Deleting twice is harmless.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{FetchRequest, Response};
    use http::StatusCode;

    #[tokio::test]
    async fn test_open_and_enumerate() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.cache_names().await.unwrap().is_empty());

        db.open_cache("pwa-cache-v1.0.2").await.unwrap();
        db.open_cache("pwa-cache-v1.0.3").await.unwrap();
        db.open_cache("pwa-cache-v1.0.2").await.unwrap();

        let names = db.cache_names().await.unwrap();
        assert_eq!(names, vec!["pwa-cache-v1.0.2".to_string(), "pwa-cache-v1.0.3".to_string()]);
        assert!(db.has_cache("pwa-cache-v1.0.3").await.unwrap());
        assert!(!db.has_cache("pwa-cache-v0.9").await.unwrap());
    }

    #[tokio::test]
    async fn test_handle_does_not_create() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let _cache = db.cache("pwa-cache-v1");
        assert!(!db.has_cache("pwa-cache-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_cache("old").await.unwrap();

        assert!(db.delete_cache("old").await.unwrap());
        assert!(!db.delete_cache("old").await.unwrap());
        assert!(!db.delete_cache("never-existed").await.unwrap());
        assert!(db.cache_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_drops_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = db.open_cache("old").await.unwrap();
        let req = FetchRequest::get(url::Url::parse("https://example.com/logo.png").unwrap());
        cache.put(&req, &Response::new(StatusCode::OK, "png")).await.unwrap();

        db.delete_cache("old").await.unwrap();

        assert!(cache.match_request(&req).await.unwrap().is_none());
        assert_eq!(cache.len().await.unwrap(), 0);
    }
}
