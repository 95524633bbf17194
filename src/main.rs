use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use ascii_site::{
    application::{
        about::AboutService,
        error::AppError,
        github::RepoResolver,
        hero::HeroService,
        parser::DocumentParser,
        plaintext::{DocumentRequest, PlainTextService},
        render::{RenderService, render_service},
        sources::{ChangeListener, DocumentSource},
        syndication::{FeedChannel, SyndicationService},
    },
    cache::{PostCache, RepoCache, RepoCacheOptions},
    config,
    infra::{
        content::FileSystemDocumentSource,
        error::InfraError,
        github::GitHubClient,
        http::{self, HttpState, RequestMetrics},
        telemetry,
        watch::{ContentWatcher, watch_directory},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Text(args) => run_text(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let app = build_application_context(&settings)?;
    let shutdown = CancellationToken::new();

    let _watcher = start_content_watcher(&settings, &app.posts);
    let metrics = Arc::new(RequestMetrics::new()?);

    let http_state = HttpState {
        posts: app.posts,
        repos: app.repos,
        about: app.about,
        hero: app.hero,
        plaintext: app.plaintext,
        syndication: app.syndication,
        metrics,
        shutdown: shutdown.clone(),
    };

    tokio::spawn(cancel_on_signal(shutdown.clone()));
    serve_http(&settings, http_state, shutdown).await
}

async fn run_text(settings: config::Settings, args: config::TextArgs) -> Result<(), AppError> {
    let app = build_application_context(&settings)?;
    let request = document_request(&args);

    let document = app
        .plaintext
        .build_document(&request, &CancellationToken::new())
        .await?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(document.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    Ok(())
}

fn document_request(args: &config::TextArgs) -> DocumentRequest {
    let include = |section: config::Section| !args.skip.contains(&section);
    DocumentRequest {
        hero: include(config::Section::Hero),
        navigation: include(config::Section::Navigation),
        about: include(config::Section::About),
        blog: include(config::Section::Blog),
        github: include(config::Section::Github),
        culture: args.lang.clone(),
    }
}

struct ApplicationContext {
    posts: Arc<PostCache>,
    repos: Arc<RepoCache>,
    about: Arc<AboutService>,
    hero: Arc<HeroService>,
    plaintext: Arc<PlainTextService>,
    syndication: Arc<SyndicationService>,
}

fn build_application_context(settings: &config::Settings) -> Result<ApplicationContext, AppError> {
    let renderer: Arc<dyn RenderService> = render_service();

    let blog_source: Arc<dyn DocumentSource> =
        Arc::new(FileSystemDocumentSource::new(&settings.content.blog_dir));
    let posts = Arc::new(PostCache::new(
        blog_source,
        DocumentParser::new(renderer.clone()),
    ));

    let github = &settings.github;
    if github.skipped_repositories > 0 {
        warn!(
            skipped = github.skipped_repositories,
            "github.repositories entries without owner or name were skipped"
        );
    }
    let client = GitHubClient::new(
        github.api_base_url.clone(),
        github.token.clone(),
        github.timeout,
    )?;
    let resolver = RepoResolver::new(Arc::new(client), github.html_host.clone());
    let repos = Arc::new(RepoCache::new(
        resolver,
        RepoCacheOptions {
            live_updates: github.enable_live_updates,
            cache_duration_minutes: github.cache_duration_minutes,
            repositories: github.repositories.clone(),
        },
    ));

    let (about_dir, about_origin) = split_about_path(&settings.content.about_file)?;
    let about = Arc::new(AboutService::new(
        Arc::new(FileSystemDocumentSource::new(about_dir)),
        about_origin,
        renderer,
    ));

    let hero = Arc::new(HeroService::new(
        settings.hero.clone(),
        settings.localization.default_culture.clone(),
        settings.localization.cultures.clone(),
    ));

    let plaintext = Arc::new(PlainTextService::new(
        posts.clone(),
        repos.clone(),
        about.clone(),
        hero.clone(),
    ));
    let syndication = Arc::new(SyndicationService::new(
        posts.clone(),
        FeedChannel {
            title: settings.site.feed_title.clone(),
            description: settings.site.feed_description.clone(),
            base_url: settings.site.base_url.clone(),
        },
    ));

    info!(
        environment = %settings.site.environment,
        blog_dir = %settings.content.blog_dir.display(),
        repositories = github.repositories.len(),
        live_updates = github.enable_live_updates,
        "application context ready"
    );

    Ok(ApplicationContext {
        posts,
        repos,
        about,
        hero,
        plaintext,
        syndication,
    })
}

fn split_about_path(path: &Path) -> Result<(PathBuf, String), AppError> {
    let origin = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            InfraError::configuration(format!(
                "content.about_file `{}` does not name a file",
                path.display()
            ))
        })?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, origin))
}

/// The watcher only runs in development; production keeps the first snapshot.
fn start_content_watcher(
    settings: &config::Settings,
    posts: &Arc<PostCache>,
) -> Option<ContentWatcher> {
    if !settings.site.environment.is_development() {
        return None;
    }

    let listener: Arc<dyn ChangeListener> = posts.clone();
    match watch_directory(&settings.content.blog_dir, listener) {
        Ok(watcher) => Some(watcher),
        Err(err) => {
            warn!(error = %err, "content watcher disabled");
            None
        }
    }
}

async fn cancel_on_signal(shutdown: CancellationToken) {
    wait_for_signal().await;
    info!("shutdown signal received");
    shutdown.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            warn!(error = %err, "SIGTERM handler unavailable; waiting for ctrl-c only");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

/// Resolves on ctrl-c; never resolves when the handler cannot be installed.
async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            error = %err,
            "ctrl-c handler unavailable; shutdown only via SIGTERM or process kill"
        );
        std::future::pending::<()>().await;
    }
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = http::build_router(http_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    let graceful = shutdown.clone();
    let server = async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { graceful.cancelled().await })
            .await
    };

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_args_skip_sections() {
        let args = config::TextArgs {
            skip: vec![config::Section::Github, config::Section::Hero],
            lang: Some("es".to_string()),
            ..Default::default()
        };
        let request = document_request(&args);
        assert!(!request.hero);
        assert!(!request.github);
        assert!(request.navigation && request.about && request.blog);
        assert_eq!(request.culture.as_deref(), Some("es"));
    }

    #[test]
    fn about_path_splits_into_directory_and_origin() {
        let (dir, origin) = split_about_path(Path::new("content/about.md")).unwrap();
        assert_eq!(dir, PathBuf::from("content"));
        assert_eq!(origin, "about.md");

        let (dir, _) = split_about_path(Path::new("about.md")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_c_wait_does_not_resolve_without_a_signal() {
        let waited =
            tokio::time::timeout(std::time::Duration::from_secs(60), wait_for_ctrl_c()).await;
        assert!(waited.is_err());
    }
}
