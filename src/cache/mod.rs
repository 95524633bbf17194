//! In-memory content caches.
//!
//! - [`PostCache`]: parsed posts, populated once and dropped when the content
//!   directory changes.
//! - [`RepoCache`]: merged repository cards, recomputed after a TTL.
//!
//! Both publish immutable snapshots behind an `Arc`; readers never observe a
//! half-built snapshot and population runs at most once at a time.

mod posts;
mod repos;
mod slot;

pub use posts::{PostCache, PostSnapshot};
pub use repos::{
    MAX_CACHE_MINUTES, MIN_CACHE_MINUTES, RepoCache, RepoCacheOptions, RepoSnapshot,
    clamp_cache_minutes,
};
