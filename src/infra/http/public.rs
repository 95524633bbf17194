use axum::{
    body::Body,
    extract::{Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, VARY},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::application::{
    error::{ErrorReport, HttpError},
    plaintext::DocumentRequest,
};

use super::HttpState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    pub(super) fn culture(&self) -> Option<String> {
        self.lang
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    }
}

/// `?lang=` wins; otherwise the first `Accept-Language` tag naming a
/// configured culture, either exactly or by its primary subtag.
pub(super) async fn plain_text(
    State(state): State<HttpState>,
    Query(query): Query<LangQuery>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    let cancel = state.request_token();
    let culture = query
        .culture()
        .or_else(|| accepted_culture(&state, &headers));
    let request = DocumentRequest::with_culture(culture);
    let body = state.plaintext.build_document(&request, &cancel).await?;

    let mut response = plain_response(body);
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=30"));
    headers.insert(VARY, HeaderValue::from_static("Accept, Accept-Language"));
    Ok(response)
}

fn accepted_culture(state: &HttpState, headers: &HeaderMap) -> Option<String> {
    let header = headers.get(ACCEPT_LANGUAGE)?.to_str().ok()?;
    let known = state.hero.supported_cultures();
    header
        .split(',')
        .filter_map(|entry| entry.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .find_map(|tag| {
            let primary = tag.split(['-', '_']).next().unwrap_or(tag);
            known
                .iter()
                .find(|info| info.culture.eq_ignore_ascii_case(tag))
                .or_else(|| {
                    known
                        .iter()
                        .find(|info| info.culture.eq_ignore_ascii_case(primary))
                })
                .map(|info| info.culture.clone())
        })
}

pub(super) async fn rss_feed(State(state): State<HttpState>) -> Result<Response, HttpError> {
    let cancel = state.request_token();
    let body = state.syndication.rss_feed(&cancel).await?;
    Ok(typed_response(body, "application/rss+xml; charset=utf-8"))
}

pub(super) async fn health() -> Response {
    plain_response("ok".to_string())
}

pub(super) async fn metrics(State(state): State<HttpState>) -> Response {
    match state.metrics.render() {
        Ok(body) => typed_response(body, "text/plain; version=0.0.4; charset=utf-8"),
        Err(err) => {
            let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
            ErrorReport::from_error("infra::http::public::metrics", &err).attach(&mut response);
            response
        }
    }
}

pub(super) async fn not_found() -> HttpError {
    HttpError::not_found("infra::http::public::fallback", "no route matched")
}

fn typed_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn plain_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
