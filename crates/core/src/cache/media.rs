//! Namespaced response storage for the media cache.
//!
//! Each row is one stored response keyed by `(namespace, url)`. Namespaces
//! exist only while they hold rows; deleting one drops all of its rows.

use super::connection::CacheDb;
use super::hash::body_digest;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// One pending write into a namespace.
#[derive(Debug, Clone)]
pub struct CacheWrite {
    pub namespace: String,
    pub url: String,
    pub response: CachedResponse,
}

impl CacheDb {
    /// Look up the response stored for `url` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns `Error::CacheCorrupt` if the stored body no longer matches its
    /// digest or the stored headers cannot be decoded.
    pub async fn match_response(&self, namespace: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let namespace = namespace.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body, body_sha256
                     FROM media_cache WHERE namespace = ?1 AND url = ?2",
                    params![namespace, url],
                    |row| {
                        Ok((
                            row.get::<_, u16>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, Vec<u8>>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    },
                );

                let (status, headers_json, body, digest) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                if body_digest(&body) != digest {
                    return Err(Error::CacheCorrupt(format!("body digest mismatch for {url} in {namespace}")));
                }

                let headers = serde_json::from_str(&headers_json)?;
                Ok(Some(CachedResponse { status, headers, body }))
            })
            .await
            .map_err(Error::from)
    }

    /// Store every write in a single transaction.
    ///
    /// Either all rows are replaced or none are.
    pub async fn put_responses(&self, writes: Vec<CacheWrite>) -> Result<(), Error> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for write in &writes {
                    let headers_json = serde_json::to_string(&write.response.headers)?;
                    tx.execute(
                        "INSERT INTO media_cache (namespace, url, status, headers_json, body, body_sha256, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                         ON CONFLICT(namespace, url) DO UPDATE SET
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            body_sha256 = excluded.body_sha256,
                            stored_at = excluded.stored_at",
                        params![
                            &write.namespace,
                            &write.url,
                            write.response.status,
                            headers_json,
                            &write.response.body,
                            body_digest(&write.response.body),
                            &now,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all namespaces that currently hold at least one response.
    pub async fn namespaces(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT namespace FROM media_cache ORDER BY namespace")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a namespace and every response in it.
    ///
    /// Returns the number of deleted responses.
    pub async fn delete_namespace(&self, namespace: &str) -> Result<u64, Error> {
        let namespace = namespace.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM media_cache WHERE namespace = ?1", params![namespace])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
