//! GitHub REST client used to refresh repository cards.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{ACCEPT, HeaderValue},
};

use crate::application::github::{FetchError, RemoteRepo, RepoFetcher};

use super::error::InfraError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com/";

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

#[derive(Clone, Debug)]
pub struct GitHubClient {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base: Url, token: Option<String>, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            base,
            token: token.filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("ascii-site/", env!("CARGO_PKG_VERSION"))
    }

    fn repo_url(&self, owner: &str, name: &str) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Transport {
                message: format!("base url `{}` cannot carry a path", self.base),
            })?
            .pop_if_empty()
            .extend(["repos", owner, name]);
        Ok(url)
    }
}

#[async_trait]
impl RepoFetcher for GitHubClient {
    async fn fetch(&self, owner: &str, name: &str) -> Result<RemoteRepo, FetchError> {
        let url = self.repo_url(owner, name)?;

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE))
            .header(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        if let Some(token) = self.token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| FetchError::Transport {
            message: err.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| FetchError::Transport {
            message: err.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|err| FetchError::Decode {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;

    use super::*;

    fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
        let base = Url::parse(&server.base_url()).unwrap();
        GitHubClient::new(base, token.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_sends_headers_and_decodes_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/repos/octo/site")
                .header("accept", GITHUB_MEDIA_TYPE)
                .header("authorization", "Bearer secret");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"name":"site","description":"d","language":"Rust","html_url":"https://github.com/octo/site","stargazers_count":12,"owner":{"login":"octo"},"topics":["ascii"]}"#);
        });

        let remote = client(&server, Some("secret"))
            .fetch("octo", "site")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(remote.stargazers_count, Some(12));
        assert_eq!(remote.topics, vec!["ascii"]);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/repos/octo/missing");
            then.status(404);
        });

        let err = client(&server, None)
            .fetch("octo", "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/repos/octo/site");
            then.status(200).body("not json");
        });

        let err = client(&server, None).fetch("octo", "site").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn repo_url_appends_segments_to_base_path() {
        let base = Url::parse("https://example.test/api/").unwrap();
        let client = GitHubClient::new(base, None, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.repo_url("octo", "site").unwrap().as_str(),
            "https://example.test/api/repos/octo/site"
        );
    }
}
