use std::{collections::HashSet, sync::Arc};

use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::{
    error::Cancelled,
    metrics::{METRIC_POST_CACHE_INVALIDATE, METRIC_POST_CACHE_POPULATE},
    parser::DocumentParser,
    sources::{ChangeListener, DocumentSource},
};
use crate::domain::posts::{Post, PostSummary, listing_order};

use super::slot::SnapshotSlot;

const SOURCE: &str = "cache::posts";

/// Immutable, ordered set of parsed posts.
#[derive(Debug)]
pub struct PostSnapshot {
    posts: Vec<Post>,
}

impl PostSnapshot {
    fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(listing_order);
        Self { posts }
    }

    pub fn summaries(&self) -> Vec<PostSummary> {
        self.posts.iter().map(Post::summary).collect()
    }

    /// Case-insensitive slug lookup.
    pub fn find(&self, slug: &str) -> Option<&Post> {
        let wanted = slug.trim().to_lowercase();
        self.posts.iter().find(|post| post.slug.to_lowercase() == wanted)
    }
}

/// Lazily populated cache of every post under the document source.
pub struct PostCache {
    source: Arc<dyn DocumentSource>,
    parser: DocumentParser,
    slot: SnapshotSlot<PostSnapshot>,
}

impl PostCache {
    pub fn new(source: Arc<dyn DocumentSource>, parser: DocumentParser) -> Self {
        Self {
            source,
            parser,
            slot: SnapshotSlot::new(SOURCE),
        }
    }

    /// Current snapshot, populating it first when empty.
    ///
    /// Concurrent callers on an empty cache wait for a single population.
    pub async fn snapshot(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<PostSnapshot>, Cancelled> {
        if let Some(snapshot) = self.slot.load() {
            return Ok(snapshot);
        }

        let _gate = self.slot.enter(cancel).await?;
        if let Some(snapshot) = self.slot.load() {
            return Ok(snapshot);
        }

        let generation = self.slot.generation();
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(source = SOURCE, "post population cancelled");
                return Err(Cancelled);
            }
            snapshot = self.populate() => Arc::new(snapshot),
        };

        if !self.slot.publish(Arc::clone(&snapshot), generation) {
            debug!(
                source = SOURCE,
                "sources changed during population; snapshot not published"
            );
        }

        Ok(snapshot)
    }

    pub async fn summaries(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<PostSummary>, Cancelled> {
        Ok(self.snapshot(cancel).await?.summaries())
    }

    pub async fn by_slug(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Post>, Cancelled> {
        if slug.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.snapshot(cancel).await?.find(slug).cloned())
    }

    /// Drop the current snapshot; the next read repopulates.
    pub fn invalidate(&self) {
        self.slot.clear();
        counter!(METRIC_POST_CACHE_INVALIDATE).increment(1);
        info!(source = SOURCE, "post cache invalidated");
    }

    async fn populate(&self) -> PostSnapshot {
        let mut origins = match self.source.list_documents().await {
            Ok(origins) => origins,
            Err(err) => {
                warn!(
                    source = SOURCE,
                    error = %err,
                    "document source unavailable; serving no posts"
                );
                return PostSnapshot::new(Vec::new());
            }
        };
        origins.sort();

        let mut seen = HashSet::with_capacity(origins.len());
        let mut posts = Vec::with_capacity(origins.len());

        for origin in origins {
            let raw = match self.source.read_document(&origin).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(
                        source = SOURCE,
                        origin = %origin,
                        error = %err,
                        "skipping unreadable document"
                    );
                    continue;
                }
            };

            let post = match self.parser.parse(&raw) {
                Ok(post) => post,
                Err(err) => {
                    warn!(
                        source = SOURCE,
                        origin = %origin,
                        error = %err,
                        "skipping invalid document"
                    );
                    continue;
                }
            };

            if !seen.insert(post.slug.to_lowercase()) {
                warn!(
                    source = SOURCE,
                    origin = %origin,
                    slug = %post.slug,
                    "skipping document with duplicate slug"
                );
                continue;
            }

            posts.push(post);
        }

        counter!(METRIC_POST_CACHE_POPULATE).increment(1);
        info!(source = SOURCE, posts = posts.len(), "post cache populated");
        PostSnapshot::new(posts)
    }
}

impl ChangeListener for PostCache {
    fn on_source_changed(&self) {
        self.invalidate();
    }
}
