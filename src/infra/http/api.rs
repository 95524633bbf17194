//! Read-only JSON views over the caches and content services.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::application::error::HttpError;
use crate::domain::{
    about::AboutContent,
    github::RepoEntry,
    hero::{CultureInfo, HeroContent},
    posts::{Post, PostSummary},
};

use super::{HttpState, public::LangQuery};

pub(super) async fn list_posts(
    State(state): State<HttpState>,
) -> Result<Json<Vec<PostSummary>>, HttpError> {
    let cancel = state.request_token();
    Ok(Json(state.posts.summaries(&cancel).await?))
}

pub(super) async fn get_post(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, HttpError> {
    let cancel = state.request_token();
    match state.posts.by_slug(&slug, &cancel).await? {
        Some(post) => Ok(Json(post)),
        None => Err(HttpError::not_found(
            "infra::http::api::get_post",
            format!("no post with slug `{slug}`"),
        )),
    }
}

pub(super) async fn list_repos(
    State(state): State<HttpState>,
) -> Result<Json<Vec<RepoEntry>>, HttpError> {
    let cancel = state.request_token();
    let snapshot = state.repos.entries(&cancel).await?;
    Ok(Json(snapshot.entries().to_vec()))
}

pub(super) async fn about(State(state): State<HttpState>) -> Result<Json<AboutContent>, HttpError> {
    let cancel = state.request_token();
    Ok(Json(state.about.load(&cancel).await?))
}

pub(super) async fn hero(
    State(state): State<HttpState>,
    Query(query): Query<LangQuery>,
) -> Json<HeroContent> {
    Json(state.hero.hero(query.culture().as_deref()))
}

pub(super) async fn cultures(State(state): State<HttpState>) -> Json<Vec<CultureInfo>> {
    Json(state.hero.supported_cultures())
}
