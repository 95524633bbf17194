//! HTTP surface: plain-text site, RSS feed, JSON API, health check and
//! Prometheus metrics.

mod api;
mod metrics;
mod middleware;
mod public;

use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, routing::get};
use tokio_util::sync::CancellationToken;

use crate::application::{
    about::AboutService, hero::HeroService, plaintext::PlainTextService,
    syndication::SyndicationService,
};
use crate::cache::{PostCache, RepoCache};

pub use metrics::RequestMetrics;
pub use middleware::{CORRELATION_ID_HEADER, REQUEST_ID_HEADER, RequestContext};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostCache>,
    pub repos: Arc<RepoCache>,
    pub about: Arc<AboutService>,
    pub hero: Arc<HeroService>,
    pub plaintext: Arc<PlainTextService>,
    pub syndication: Arc<SyndicationService>,
    pub metrics: Arc<RequestMetrics>,
    pub shutdown: CancellationToken,
}

impl HttpState {
    /// Token for one request; cancelled when the server shuts down.
    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

pub fn build_router(state: HttpState) -> Router {
    let request_metrics = Arc::clone(&state.metrics);
    Router::new()
        .route("/", get(public::plain_text))
        .route("/text", get(public::plain_text))
        .route("/feed", get(public::rss_feed))
        .route("/health", get(public::health))
        .route("/metrics", get(public::metrics))
        .route("/api/posts", get(api::list_posts))
        .route("/api/posts/{slug}", get(api::get_post))
        .route("/api/repos", get(api::list_repos))
        .route("/api/about", get(api::about))
        .route("/api/hero", get(api::hero))
        .route("/api/cultures", get(api::cultures))
        .fallback(public::not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            request_metrics,
            metrics::count_requests,
        ))
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
        .layer(axum_middleware::from_fn(middleware::security_headers))
}
