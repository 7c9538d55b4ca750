//! Credential table operations.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::{params, rusqlite};

/// A provisioned user row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Stored for compatibility; nothing enforces it.
    pub level: i64,
}

impl CacheDb {
    /// Get the stored password hash for a user.
    ///
    /// Returns None if the user doesn't exist.
    pub async fn get_password_hash(&self, username: &str) -> Result<Option<String>, Error> {
        let username = username.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare("SELECT password_hash FROM users WHERE username = ?1")?;

                match stmt.query_row(params![username], |row| row.get(0)) {
                    Ok(hash) => Ok(Some(hash)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a user.
    pub async fn upsert_user(&self, user: &UserRecord) -> Result<(), Error> {
        let user = user.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO users (username, password_hash, level) VALUES (?1, ?2, ?3)
                    ON CONFLICT(username) DO UPDATE SET
                        password_hash = excluded.password_hash,
                        level = excluded.level",
                    params![user.username, user.password_hash, user.level],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, hash: &str) -> UserRecord {
        UserRecord { username: username.into(), password_hash: hash.into(), level: 0 }
    }

    #[tokio::test]
    async fn test_upsert_and_get_hash() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_user(&record("alice", "$argon2id$stub")).await.unwrap();

        let hash = db.get_password_hash("alice").await.unwrap();
        assert_eq!(hash.as_deref(), Some("$argon2id$stub"));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_password_hash("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_hash() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.upsert_user(&record("bob", "first")).await.unwrap();
        db.upsert_user(&UserRecord { level: 3, ..record("bob", "second") }).await.unwrap();

        assert_eq!(db.get_password_hash("bob").await.unwrap().as_deref(), Some("second"));
    }
}
