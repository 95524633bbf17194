//! Live/fallback resolution of configured GitHub repository cards.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::metrics::METRIC_REPO_FETCH_FAILURE;
use crate::domain::{
    github::{RepoEntry, RepoEntryConfig, UNKNOWN_LANGUAGE},
    text::{non_blank, normalize_labels},
};

const SOURCE: &str = "application::github";

pub const DEFAULT_HTML_HOST: &str = "github.com";

/// Subset of the GitHub `GET /repos/{owner}/{repo}` payload used for cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteRepo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub pushed_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub owner: Option<RemoteOwner>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteOwner {
    pub login: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("remote responded with status {status}")]
    Status { status: u16 },
    #[error("transport failure: {message}")]
    Transport { message: String },
    #[error("malformed payload: {message}")]
    Decode { message: String },
}

/// Fetches repository metadata from the remote listing service.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn fetch(&self, owner: &str, name: &str) -> Result<RemoteRepo, FetchError>;
}

/// Merges live repository data with static configuration.
#[derive(Clone)]
pub struct RepoResolver {
    fetcher: Arc<dyn RepoFetcher>,
    html_host: String,
}

impl RepoResolver {
    pub fn new(fetcher: Arc<dyn RepoFetcher>, html_host: impl Into<String>) -> Self {
        Self {
            fetcher,
            html_host: html_host.into(),
        }
    }

    /// Resolve one configured entry. Returns `None` only for a blank owner or name.
    ///
    /// Fetch failures and cancellation both degrade to the configuration-only entry.
    pub async fn resolve(
        &self,
        config: &RepoEntryConfig,
        live_enabled: bool,
        cancel: &CancellationToken,
    ) -> Option<RepoEntry> {
        let owner = non_blank(Some(config.owner.as_str()))?;
        let name = non_blank(Some(config.name.as_str()))?;

        if !live_enabled {
            return Some(self.from_config(config, owner, name));
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(owner, name, source = SOURCE, "fetch cancelled; using configuration");
                return Some(self.from_config(config, owner, name));
            }
            result = self.fetcher.fetch(owner, name) => result,
        };

        match fetched {
            Ok(remote) => Some(self.merge(config, owner, name, remote)),
            Err(err) => {
                metrics::counter!(METRIC_REPO_FETCH_FAILURE).increment(1);
                warn!(
                    owner,
                    name,
                    error = %err,
                    source = SOURCE,
                    "failed to fetch repository; using configuration"
                );
                Some(self.from_config(config, owner, name))
            }
        }
    }

    fn merge(
        &self,
        config: &RepoEntryConfig,
        owner: &str,
        name: &str,
        remote: RemoteRepo,
    ) -> RepoEntry {
        let owner = remote
            .owner
            .as_ref()
            .and_then(|o| non_blank(Some(o.login.as_str())))
            .unwrap_or(owner)
            .to_string();
        let name = non_blank(remote.name.as_deref()).unwrap_or(name).to_string();

        let display_name = non_blank(config.display_name.as_deref())
            .unwrap_or(name.as_str())
            .to_string();
        let description = non_blank(config.description.as_deref())
            .or_else(|| non_blank(remote.description.as_deref()))
            .unwrap_or_default()
            .to_string();
        let language = non_blank(config.language.as_deref())
            .or_else(|| non_blank(remote.language.as_deref()))
            .unwrap_or(UNKNOWN_LANGUAGE)
            .to_string();
        let topics = match config.topics.as_ref() {
            Some(topics) => normalize_labels(topics),
            None => normalize_labels(&remote.topics),
        };
        let url = non_blank(config.url.as_deref())
            .or_else(|| non_blank(remote.html_url.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| self.canonical_url(&owner, &name));

        RepoEntry {
            display_name,
            description,
            language,
            topics,
            stars: remote.stargazers_count.unwrap_or(config.stars),
            last_updated: remote.pushed_at.or(config.last_updated),
            url,
            owner,
            name,
            is_live: true,
        }
    }

    fn from_config(&self, config: &RepoEntryConfig, owner: &str, name: &str) -> RepoEntry {
        RepoEntry {
            owner: owner.to_string(),
            name: name.to_string(),
            display_name: non_blank(config.display_name.as_deref())
                .unwrap_or(name)
                .to_string(),
            description: non_blank(config.description.as_deref())
                .unwrap_or_default()
                .to_string(),
            language: non_blank(config.language.as_deref())
                .unwrap_or(UNKNOWN_LANGUAGE)
                .to_string(),
            topics: config
                .topics
                .as_ref()
                .map(normalize_labels)
                .unwrap_or_default(),
            stars: config.stars,
            last_updated: config.last_updated,
            url: non_blank(config.url.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| self.canonical_url(owner, name)),
            is_live: false,
        }
    }

    fn canonical_url(&self, owner: &str, name: &str) -> String {
        format!("https://{}/{owner}/{name}", self.html_host)
    }
}
