//! Response cache rows.
//!
//! Raw upstream HTTP exchanges keyed by request fingerprint. Expiry is stored
//! as unix epoch seconds so the purge is a single range delete.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::{params, rusqlite};

/// Fixed lifetime of a cached upstream response, in seconds.
pub const RESPONSE_TTL_SECS: i64 = 86_400;

impl CacheDb {
    /// Get the raw bytes stored for a fingerprint.
    ///
    /// Returns None if nothing is stored or the row expired before `now`.
    pub async fn get_response(&self, fingerprint: &str, now: i64) -> Result<Option<Vec<u8>>, Error> {
        let fingerprint = fingerprint.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Vec<u8>>, Error> {
                let mut stmt =
                    conn.prepare("SELECT raw_bytes FROM response_cache WHERE fingerprint = ?1 AND expires_at >= ?2")?;

                match stmt.query_row(params![fingerprint, now], |row| row.get(0)) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the raw bytes stored for a fingerprint.
    pub async fn put_response(&self, fingerprint: &str, raw_bytes: Vec<u8>, expires_at: i64) -> Result<(), Error> {
        let fingerprint = fingerprint.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO response_cache (fingerprint, raw_bytes, expires_at)
                    VALUES (?1, ?2, ?3)
                    ON CONFLICT(fingerprint) DO UPDATE SET
                        raw_bytes = excluded.raw_bytes,
                        expires_at = excluded.expires_at",
                    params![fingerprint, raw_bytes, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every row whose expiry is strictly before `cutoff`.
    ///
    /// Returns the number of deleted rows.
    pub async fn delete_responses_before(&self, cutoff: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM response_cache WHERE expires_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired response rows as of now.
    pub async fn purge_expired_responses(&self) -> Result<u64, Error> {
        self.delete_responses_before(chrono::Utc::now().timestamp()).await
    }
}
