use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::text::compare_ignore_case;

/// Language shown when neither configuration nor the API supplies one.
pub const UNKNOWN_LANGUAGE: &str = "n/a";

/// Statically configured repository card; every optional field overrides live data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RepoEntryConfig {
    pub owner: String,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub topics: Option<Vec<String>>,
    pub url: Option<String>,
    pub stars: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
}

/// Repository card ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoEntry {
    pub owner: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub language: String,
    pub topics: Vec<String>,
    pub stars: u64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
    pub url: String,
    pub is_live: bool,
}

/// Most starred first; ties ordered by display name, ignoring case.
pub fn listing_order(left: &RepoEntry, right: &RepoEntry) -> Ordering {
    right
        .stars
        .cmp(&left.stars)
        .then_with(|| compare_ignore_case(&left.display_name, &right.display_name))
}
