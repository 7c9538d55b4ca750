//! Background purge of expired response rows.

use std::time::Duration;

use super::connection::CacheDb;
use tokio::task::JoinHandle;

/// Default interval between purge runs.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawn the long-lived purge loop.
///
/// The first purge runs immediately, then once per `every`. Storage errors are
/// logged and the loop keeps going; it only stops when the runtime shuts down
/// or the returned handle is aborted.
pub fn spawn_purger(db: CacheDb, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match db.purge_expired_responses().await {
                Ok(0) => tracing::trace!("purge found no expired responses"),
                Ok(deleted) => tracing::info!(deleted, "purged expired responses"),
                Err(e) => tracing::warn!(error = %e, "failed to purge expired responses"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_purger_runs_immediately() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_response("stale", b"x".to_vec(), 1).await.unwrap();

        let handle = spawn_purger(db.clone(), Duration::from_secs(3600));

        let mut gone = false;
        for _ in 0..50 {
            if db.get_response("stale", 0).await.unwrap().is_none() {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert!(gone);
    }
}
