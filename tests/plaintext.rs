use std::sync::Arc;

use ascii_site::{
    application::{
        about::AboutService,
        error::Cancelled,
        github::{FetchError, RemoteRepo, RepoFetcher, RepoResolver},
        hero::HeroService,
        parser::DocumentParser,
        plaintext::{DocumentRequest, PlainTextService},
        render::render_service,
    },
    cache::{PostCache, RepoCache, RepoCacheOptions},
    domain::{
        github::RepoEntryConfig,
        hero::{CultureDefinition, HeroDefinition, HeroLocalization, NavigationLink},
    },
    infra::content::InMemoryDocumentSource,
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

struct OfflineFetcher;

#[async_trait]
impl RepoFetcher for OfflineFetcher {
    async fn fetch(&self, _owner: &str, _name: &str) -> Result<RemoteRepo, FetchError> {
        panic!("live updates are disabled in these tests");
    }
}

fn post(title: &str, published: &str, summary: &str) -> String {
    format!("---\ntitle: {title}\npublished: {published}\nsummary: {summary}\n---\nBody\n")
}

fn hero() -> HeroDefinition {
    HeroDefinition {
        lines: vec![" /\\".into(), "/__\\".into()],
        tagline: "Plain text forever.".into(),
        call_to_action_text: "Start".into(),
        call_to_action_url: "/start".into(),
        navigation: vec![
            NavigationLink::new("Blog", "/blog"),
            NavigationLink::new("Source", "https://example.com/src"),
        ],
    }
}

fn cultures() -> Vec<CultureDefinition> {
    vec![
        CultureDefinition {
            culture: "en".into(),
            display_name: "English".into(),
            hero: None,
        },
        CultureDefinition {
            culture: "es-ES".into(),
            display_name: "Español".into(),
            hero: Some(HeroLocalization {
                tagline: "Texto plano para siempre.".into(),
                call_to_action_text: "Empezar".into(),
                call_to_action_url: None,
            }),
        },
    ]
}

fn repo(name: &str, stars: u64) -> RepoEntryConfig {
    RepoEntryConfig {
        owner: "octo".into(),
        name: name.into(),
        description: Some(format!("About {name}")),
        language: Some("Rust".into()),
        stars,
        ..Default::default()
    }
}

struct Fixture {
    blog: Arc<InMemoryDocumentSource>,
    about: Arc<InMemoryDocumentSource>,
    repositories: Vec<RepoEntryConfig>,
}

impl Fixture {
    fn empty() -> Self {
        Self {
            blog: Arc::new(InMemoryDocumentSource::new()),
            about: Arc::new(InMemoryDocumentSource::new()),
            repositories: Vec::new(),
        }
    }

    fn service(&self) -> PlainTextService {
        let renderer = render_service();
        let posts = Arc::new(PostCache::new(
            self.blog.clone(),
            DocumentParser::new(renderer.clone()),
        ));
        let repos = Arc::new(RepoCache::new(
            RepoResolver::new(Arc::new(OfflineFetcher), "github.com"),
            RepoCacheOptions {
                live_updates: false,
                cache_duration_minutes: 15,
                repositories: self.repositories.clone(),
            },
        ));
        let about = Arc::new(AboutService::new(self.about.clone(), "about.md", renderer));
        let hero = Arc::new(HeroService::new(hero(), "en", cultures()));
        PlainTextService::new(posts, repos, about, hero)
    }
}

async fn build(fixture: &Fixture, request: DocumentRequest) -> String {
    fixture
        .service()
        .build_document(&request, &CancellationToken::new())
        .await
        .expect("document")
}

#[tokio::test]
async fn empty_site_renders_every_placeholder() {
    let document = build(&Fixture::empty(), DocumentRequest::default()).await;

    let expected = [
        " /\\",
        "/__\\",
        "",
        "Plain text forever.",
        "[Start] -> /start",
        "",
        "NAVIGATION",
        "- Blog :: /blog",
        "- Source :: https://example.com/src",
        "",
        "ABOUT",
        "Update content/about.md to share your story.",
        "",
        "BLOG",
        "No posts yet. Add markdown under content/blog to publish updates.",
        "",
        "GITHUB",
        "No repositories configured.",
        "",
        "Powered by ascii-site. curl /text for this view.",
        "",
    ]
    .join("\n");
    assert_eq!(document, expected);
}

#[tokio::test]
async fn blog_and_github_sections_are_capped() {
    let fixture = Fixture::empty();
    for day in 1..=5 {
        fixture.blog.insert(
            format!("post-{day}.md"),
            post(&format!("Post {day}"), &format!("2024-03-0{day}"), "Short summary"),
        );
    }
    let fixture = Fixture {
        repositories: (1..=6).map(|n| repo(&format!("repo-{n}"), n)).collect(),
        ..fixture
    };

    let document = build(&fixture, DocumentRequest::default()).await;

    assert!(document.contains("- Post 5 (2024-03-05)\n  Short summary\n  Read: /blog/post-5\n"));
    assert!(document.contains("- Post 3 (2024-03-03)"));
    assert!(!document.contains("Post 2"));
    assert_eq!(document.matches("Read: /blog/").count(), 3);

    assert!(document.contains(
        "- repo-6 (Rust, 6 stars)\n  About repo-6\n  https://github.com/octo/repo-6\n"
    ));
    assert_eq!(document.matches("https://github.com/octo/").count(), 4);
    assert!(!document.contains("repo-2"));

    assert!(document.ends_with("Powered by ascii-site. curl /text for this view.\n"));
    assert!(!document.contains("\n\n\n"));
}

#[tokio::test]
async fn about_summary_is_wrapped() {
    let fixture = Fixture::empty();
    let paragraph = "word ".repeat(40);
    fixture
        .about
        .insert("about.md", format!("# About me\n\n{paragraph}\n"));

    let document = build(&fixture, DocumentRequest::default()).await;
    let about = document
        .split("ABOUT\n")
        .nth(1)
        .and_then(|rest| rest.split("\n\n").next())
        .expect("about section");

    assert!(!about.contains("About me"));
    assert!(about.lines().count() > 1);
    assert!(about.lines().all(|line| line.chars().count() <= 78));
}

#[tokio::test]
async fn skipped_sections_are_omitted() {
    let request = DocumentRequest {
        hero: false,
        navigation: false,
        github: false,
        ..DocumentRequest::default()
    };
    let document = build(&Fixture::empty(), request).await;

    assert!(document.starts_with("ABOUT\n"));
    assert!(!document.contains("NAVIGATION"));
    assert!(!document.contains("GITHUB"));
    assert!(document.contains("BLOG\n"));
}

#[tokio::test]
async fn culture_selects_localized_tagline() {
    let fixture = Fixture::empty();

    let spanish = build(&fixture, DocumentRequest::with_culture(Some("es_es".into()))).await;
    assert!(spanish.contains("Texto plano para siempre.\n[Empezar] -> /start\n"));

    let unknown = build(&fixture, DocumentRequest::with_culture(Some("fr".into()))).await;
    assert!(unknown.contains("Plain text forever.\n[Start] -> /start\n"));
}

#[tokio::test]
async fn cancelled_request_returns_cancelled() {
    let fixture = Fixture::empty();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = fixture
        .service()
        .build_document(&DocumentRequest::default(), &cancel)
        .await;
    assert_eq!(result, Err(Cancelled));
}
