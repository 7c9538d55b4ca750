//! Username/password verification with a short-lived success cache.
//!
//! The slow path checks the Argon2id hash stored in the `users` table. A
//! successful check remembers the password in a bounded LRU for an hour so
//! repeat requests skip the hash; cached secrets are compared in constant time
//! and zeroized on eviction.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use lru::LruCache;
use parking_lot::Mutex;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::Error;
use crate::cache::CacheDb;

/// Maximum number of users remembered after a successful check.
pub const CREDENTIAL_CACHE_CAPACITY: usize = 256;

/// How long a remembered success stays valid.
pub const CREDENTIAL_CACHE_TTL: Duration = Duration::from_secs(3600);

struct CachedSecret {
    secret: Zeroizing<String>,
    stored_at: Instant,
}

/// Verifies credentials against the store.
pub struct CredentialVerifier {
    db: CacheDb,
    cache: Mutex<LruCache<String, CachedSecret>>,
    ttl: Duration,
    hash_verifications: AtomicU64,
}

impl CredentialVerifier {
    pub fn new(db: CacheDb) -> Self {
        Self::with_limits(db, CREDENTIAL_CACHE_CAPACITY, CREDENTIAL_CACHE_TTL)
    }

    pub fn with_limits(db: CacheDb, capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { db, cache: Mutex::new(LruCache::new(cap)), ttl, hash_verifications: AtomicU64::new(0) }
    }

    /// Check a username/password pair.
    ///
    /// Never errors: unknown users, wrong passwords, malformed hashes and
    /// storage failures all come back as `false` (the latter two are logged).
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        if self.check_cached(username, password) {
            tracing::trace!(username, "credential cache hit");
            return true;
        }

        let stored = match self.db.get_password_hash(username).await {
            Ok(Some(hash)) => hash,
            Ok(None) => {
                tracing::debug!(username, "unknown user");
                return false;
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "failed to load password hash");
                return false;
            }
        };

        self.hash_verifications.fetch_add(1, Ordering::Relaxed);
        let candidate = Zeroizing::new(password.to_owned());
        let checked = {
            let candidate = candidate.clone();
            tokio::task::spawn_blocking(move || verify_password(&candidate, &stored)).await
        };

        match checked {
            Ok(Ok(true)) => {
                self.cache
                    .lock()
                    .put(username.to_owned(), CachedSecret { secret: candidate, stored_at: Instant::now() });
                true
            }
            Ok(Ok(false)) => {
                tracing::debug!(username, "password mismatch");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(username, error = %e, "stored password hash is unusable");
                false
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "password verification task failed");
                false
            }
        }
    }

    /// Number of times the slow Argon2 path ran.
    pub fn hash_verifications(&self) -> u64 {
        self.hash_verifications.load(Ordering::Relaxed)
    }

    /// Number of users currently remembered.
    pub fn cached_users(&self) -> usize {
        self.cache.lock().len()
    }

    fn check_cached(&self, username: &str, password: &str) -> bool {
        let mut cache = self.cache.lock();
        let (expired, matched) = match cache.get(username) {
            None => return false,
            Some(entry) if entry.stored_at.elapsed() >= self.ttl => (true, false),
            Some(entry) => (false, bool::from(entry.secret.as_bytes().ct_eq(password.as_bytes()))),
        };
        if expired {
            cache.pop(username);
        }
        matched
    }
}

/// Hash a password as an Argon2id PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    hash_with(&Argon2::default(), password)
}

fn hash_with(argon: &Argon2<'_>, password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    argon
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Check a password against a PHC string; parameters come from the hash.
fn verify_password(password: &str, phc: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(phc).map_err(|e| Error::PasswordHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::PasswordHash(e.to_string())),
    }
}
