use std::time::{Duration, Instant};

use sqlx::{Pool, Postgres};
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::job_repository::JobRepository;
use crate::db::models::StatusRow;

/// Session-lifetime cache for the immutable status reference set.
///
/// Injected as shared state rather than hidden behind a fetch-if-empty guard,
/// so staleness is governed by an explicit TTL and `invalidate` instead of the
/// lifetime of the process.
pub struct StatusCache {
    ttl: Duration,
    inner: RwLock<Option<Entry>>,
}

struct Entry {
    fetched_at: Instant,
    statuses: Vec<StatusRow>,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        StatusCache {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Return the cached set, fetching from the store on miss or expiry.
    pub async fn get(&self, pool: &Pool<Postgres>) -> Result<Vec<StatusRow>, sqlx::Error> {
        if let Some(cached) = self.cached().await {
            return Ok(cached);
        }
        let rows = JobRepository::statuses(pool).await?;
        debug!("status cache refreshed with {} entries", rows.len());
        self.store(rows.clone()).await;
        Ok(rows)
    }

    /// The cached set, if present and not past its TTL.
    pub async fn cached(&self) -> Option<Vec<StatusRow>> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.statuses.clone())
    }

    pub async fn store(&self, statuses: Vec<StatusRow>) {
        *self.inner.write().await = Some(Entry {
            fetched_at: Instant::now(),
            statuses,
        });
    }

    pub async fn invalidate(&self) {
        debug!("status cache invalidated");
        *self.inner.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<StatusRow> {
        vec![StatusRow {
            id: 1,
            code: "received".into(),
            label: "Received".into(),
        }]
    }

    #[tokio::test]
    async fn cached_returns_stored_set_within_ttl() {
        let cache = StatusCache::new(Duration::from_secs(60));
        assert!(cache.cached().await.is_none());

        cache.store(sample()).await;
        let cached = cache.cached().await.expect("entry within ttl");
        assert_eq!(cached[0].code, "received");
    }

    #[tokio::test]
    async fn invalidate_drops_the_entry() {
        let cache = StatusCache::new(Duration::from_secs(60));
        cache.store(sample()).await;
        cache.invalidate().await;
        assert!(cache.cached().await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_expires_immediately() {
        let cache = StatusCache::new(Duration::ZERO);
        cache.store(sample()).await;
        assert!(cache.cached().await.is_none());
    }
}
