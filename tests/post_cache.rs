use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ascii_site::{
    application::{
        error::Cancelled,
        parser::{DocumentParser, RawDocument},
        render::render_service,
        sources::{ChangeListener, DocumentSource, SourceError},
    },
    cache::PostCache,
    infra::content::{FileSystemDocumentSource, InMemoryDocumentSource},
};
use async_trait::async_trait;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

/// In-memory source that counts enumerations and can stall each one after
/// the listing is taken.
struct CountingSource {
    inner: InMemoryDocumentSource,
    lists: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingSource {
    fn new(inner: InMemoryDocumentSource, delay: Option<Duration>) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            delay,
        }
    }

    fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentSource for CountingSource {
    async fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let listing = self.inner.list_documents().await;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        listing
    }

    async fn read_document(&self, origin: &str) -> Result<RawDocument, SourceError> {
        self.inner.read_document(origin).await
    }
}

fn doc(title: &str, published: &str) -> String {
    format!("---\ntitle: \"{title}\"\npublished: {published}\n---\nBody of {title}.\n")
}

fn cache_over(source: Arc<dyn DocumentSource>) -> PostCache {
    PostCache::new(source, DocumentParser::new(render_service()))
}

fn titles(cache_titles: Vec<ascii_site::domain::posts::PostSummary>) -> Vec<String> {
    cache_titles.into_iter().map(|summary| summary.title).collect()
}

#[tokio::test]
async fn summaries_are_ordered_newest_first_then_by_title() {
    let source = InMemoryDocumentSource::with_documents([
        ("old.md", doc("Old", "2023-12-31")),
        ("beta.md", doc("beta", "2024-02-01")),
        ("alpha.md", doc("Alpha", "2024-02-01")),
        ("new.md", doc("New", "2024-06-01")),
    ]);
    let cache = cache_over(Arc::new(source));

    let summaries = cache.summaries(&CancellationToken::new()).await.unwrap();
    assert_eq!(titles(summaries), vec!["New", "Alpha", "beta", "Old"]);
}

#[tokio::test]
async fn invalid_documents_are_excluded_one_for_one() {
    let source = InMemoryDocumentSource::with_documents([
        ("a.md", doc("A", "2024-01-01")),
        ("b.md", doc("B", "2024-01-02")),
        ("c.md", doc("C", "2024-01-03")),
    ]);
    let source = Arc::new(source);
    let cache = cache_over(source.clone());
    let cancel = CancellationToken::new();
    assert_eq!(cache.summaries(&cancel).await.unwrap().len(), 3);

    source.insert("untitled.md", "---\npublished: 2024-01-04\n---\nBody\n");
    cache.invalidate();
    assert_eq!(cache.summaries(&cancel).await.unwrap().len(), 3);

    source.insert("b.md", "---\ntitle: B\npublished: 2024-02-30\n---\nBody\n");
    cache.invalidate();
    let remaining = titles(cache.summaries(&cancel).await.unwrap());
    assert_eq!(remaining, vec!["C", "A"]);
}

#[tokio::test]
async fn first_document_in_origin_order_wins_duplicate_slug() {
    let source = InMemoryDocumentSource::with_documents([
        (
            "b-second.md",
            "---\ntitle: Second\nslug: Shared Slug\npublished: 2024-05-01\n---\nB\n",
        ),
        (
            "a-first.md",
            "---\ntitle: First\nslug: shared-slug\npublished: 2024-01-01\n---\nA\n",
        ),
    ]);
    let cache = cache_over(Arc::new(source));
    let cancel = CancellationToken::new();

    let summaries = cache.summaries(&cancel).await.unwrap();
    assert_eq!(titles(summaries), vec!["First"]);

    let post = cache.by_slug("SHARED-SLUG", &cancel).await.unwrap().unwrap();
    assert_eq!(post.title, "First");
}

#[tokio::test]
async fn by_slug_handles_blank_and_unknown_slugs() {
    let source = Arc::new(CountingSource::new(
        InMemoryDocumentSource::with_documents([("hello.md", doc("Hello", "2024-01-01"))]),
        None,
    ));
    let cache = cache_over(source.clone());
    let cancel = CancellationToken::new();

    assert!(cache.by_slug("   ", &cancel).await.unwrap().is_none());
    assert_eq!(source.lists(), 0);

    assert!(cache.by_slug("missing", &cancel).await.unwrap().is_none());
    let post = cache.by_slug("Hello", &cancel).await.unwrap().unwrap();
    assert_eq!(post.slug, "hello");
    assert!(post.body_html.contains("Body of Hello."));
}

#[tokio::test]
async fn change_notification_refreshes_the_snapshot() {
    let source = Arc::new(CountingSource::new(
        InMemoryDocumentSource::with_documents([("one.md", doc("One", "2024-01-01"))]),
        None,
    ));
    let cache = Arc::new(cache_over(source.clone()));
    let cancel = CancellationToken::new();

    assert_eq!(cache.summaries(&cancel).await.unwrap().len(), 1);

    source.inner.insert("two.md", doc("Two", "2024-01-02"));
    assert_eq!(
        cache.summaries(&cancel).await.unwrap().len(),
        1,
        "snapshot is stable until invalidated"
    );

    let listener: Arc<dyn ChangeListener> = cache.clone();
    listener.on_source_changed();
    assert_eq!(
        titles(cache.summaries(&cancel).await.unwrap()),
        vec!["Two", "One"]
    );

    source.inner.remove("one.md");
    listener.on_source_changed();
    assert_eq!(titles(cache.summaries(&cancel).await.unwrap()), vec!["Two"]);
    assert_eq!(source.lists(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_readers_share_one_population() {
    let documents = (1..=20).map(|day| {
        (
            format!("post-{day:02}.md"),
            doc(&format!("Post {day}"), &format!("2024-01-{day:02}")),
        )
    });
    let source = Arc::new(CountingSource::new(
        InMemoryDocumentSource::with_documents(documents),
        Some(Duration::from_millis(50)),
    ));
    let cache = Arc::new(cache_over(source.clone()));

    let readers = (0..16).map(|_| {
        let cache = cache.clone();
        tokio::spawn(async move { cache.summaries(&CancellationToken::new()).await })
    });
    let results = join_all(readers).await;

    for result in results {
        let summaries = result.expect("reader task").expect("not cancelled");
        assert_eq!(summaries.len(), 20);
        assert_eq!(summaries[0].title, "Post 20");
    }
    assert_eq!(source.lists(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_population_publishes_nothing() {
    let source = Arc::new(CountingSource::new(
        InMemoryDocumentSource::with_documents([("one.md", doc("One", "2024-01-01"))]),
        Some(Duration::from_secs(1)),
    ));
    let cache = cache_over(source.clone());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    assert_eq!(cache.summaries(&cancel).await, Err(Cancelled));
    assert_eq!(source.lists(), 1);

    let summaries = cache.summaries(&CancellationToken::new()).await.unwrap();
    assert_eq!(titles(summaries), vec!["One"]);
    assert_eq!(source.lists(), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidation_during_population_is_not_lost() {
    let source = Arc::new(CountingSource::new(
        InMemoryDocumentSource::with_documents([("one.md", doc("One", "2024-01-01"))]),
        Some(Duration::from_secs(1)),
    ));
    let cache = Arc::new(cache_over(source.clone()));

    let first = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.summaries(&CancellationToken::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(source.lists(), 1);

    let waiter = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.summaries(&CancellationToken::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    source.inner.insert("two.md", doc("Two", "2024-01-02"));
    cache.invalidate();

    let first = first.await.expect("first reader").expect("not cancelled");
    assert_eq!(titles(first), vec!["One"], "in-flight caller keeps its listing");

    let waited = waiter.await.expect("waiter").expect("not cancelled");
    assert_eq!(titles(waited), vec!["Two", "One"]);
    assert_eq!(source.lists(), 2, "stale population was not published");

    let again = cache.summaries(&CancellationToken::new()).await.unwrap();
    assert_eq!(titles(again), vec!["Two", "One"]);
    assert_eq!(source.lists(), 2);
}

#[tokio::test]
async fn already_cancelled_token_short_circuits() {
    let source = Arc::new(CountingSource::new(InMemoryDocumentSource::new(), None));
    let cache = cache_over(source.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(cache.summaries(&cancel).await, Err(Cancelled));
    assert_eq!(source.lists(), 0);
}

#[tokio::test]
async fn missing_content_directory_yields_empty_listing() {
    let dir = tempfile::tempdir().unwrap();
    let source = FileSystemDocumentSource::new(dir.path().join("does-not-exist"));
    let cache = cache_over(Arc::new(source));

    let summaries = cache.summaries(&CancellationToken::new()).await.unwrap();
    assert!(summaries.is_empty());
}

#[tokio::test]
async fn file_system_posts_are_parsed_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("first-post.md"),
        "---\ntitle: First post\npublished: 2024-02-10\ntags: [\"B\", \"a\", \"a\", \" B \"]\n---\n\nHello from disk.\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("broken.md"), "no header here").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let cache = cache_over(Arc::new(FileSystemDocumentSource::new(dir.path())));
    let summaries = cache.summaries(&CancellationToken::new()).await.unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].slug, "first-post");
    assert_eq!(summaries[0].tags, vec!["a", "b"]);
    assert_eq!(summaries[0].summary, "Hello from disk.");
}
