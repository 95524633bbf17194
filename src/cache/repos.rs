use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use metrics::counter;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::{
    error::Cancelled, github::RepoResolver, metrics::METRIC_REPO_CACHE_REFRESH,
};
use crate::domain::github::{RepoEntry, RepoEntryConfig, listing_order};

use super::slot::SnapshotSlot;

const SOURCE: &str = "cache::repos";

pub const MIN_CACHE_MINUTES: u64 = 1;
pub const MAX_CACHE_MINUTES: u64 = 1440;

pub fn clamp_cache_minutes(minutes: u64) -> u64 {
    minutes.clamp(MIN_CACHE_MINUTES, MAX_CACHE_MINUTES)
}

#[derive(Debug, Clone)]
pub struct RepoCacheOptions {
    pub live_updates: bool,
    pub cache_duration_minutes: u64,
    pub repositories: Vec<RepoEntryConfig>,
}

/// Immutable, ordered set of repository cards with an expiry instant.
#[derive(Debug)]
pub struct RepoSnapshot {
    expires_at: Instant,
    entries: Vec<RepoEntry>,
}

impl RepoSnapshot {
    pub fn entries(&self) -> &[RepoEntry] {
        &self.entries
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Time-boxed cache of the merged repository listing.
pub struct RepoCache {
    resolver: RepoResolver,
    repositories: Vec<RepoEntryConfig>,
    live_updates: bool,
    ttl: Duration,
    slot: SnapshotSlot<RepoSnapshot>,
}

impl RepoCache {
    pub fn new(resolver: RepoResolver, options: RepoCacheOptions) -> Self {
        let minutes = clamp_cache_minutes(options.cache_duration_minutes);
        Self {
            resolver,
            repositories: options.repositories,
            live_updates: options.live_updates,
            ttl: Duration::from_secs(minutes * 60),
            slot: SnapshotSlot::new(SOURCE),
        }
    }

    /// Fresh snapshot, recomputing it when missing or expired.
    ///
    /// Recomputation is single-flight: concurrent callers that find the
    /// snapshot stale wait for one refresh instead of fetching again.
    pub async fn entries(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<RepoSnapshot>, Cancelled> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let _gate = self.slot.enter(cancel).await?;
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let generation = self.slot.generation();
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(source = SOURCE, "repository refresh cancelled");
                return Err(Cancelled);
            }
            snapshot = self.refresh(cancel) => Arc::new(snapshot),
        };

        if cancel.is_cancelled() {
            return Err(Cancelled);
        }

        self.slot.publish(Arc::clone(&snapshot), generation);
        Ok(snapshot)
    }

    fn fresh(&self) -> Option<Arc<RepoSnapshot>> {
        self.slot
            .load()
            .filter(|snapshot| snapshot.is_fresh(Instant::now()))
    }

    async fn refresh(&self, cancel: &CancellationToken) -> RepoSnapshot {
        let resolutions = self
            .repositories
            .iter()
            .map(|config| self.resolver.resolve(config, self.live_updates, cancel));

        let mut entries: Vec<RepoEntry> = join_all(resolutions)
            .await
            .into_iter()
            .flatten()
            .collect();
        entries.sort_by(listing_order);

        counter!(METRIC_REPO_CACHE_REFRESH).increment(1);
        info!(
            source = SOURCE,
            entries = entries.len(),
            live = entries.iter().filter(|entry| entry.is_live).count(),
            ttl_secs = self.ttl.as_secs(),
            "repository cache refreshed"
        );

        RepoSnapshot {
            expires_at: Instant::now() + self.ttl,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_duration_is_clamped() {
        assert_eq!(clamp_cache_minutes(0), MIN_CACHE_MINUTES);
        assert_eq!(clamp_cache_minutes(15), 15);
        assert_eq!(clamp_cache_minutes(10_000), MAX_CACHE_MINUTES);
    }
}
