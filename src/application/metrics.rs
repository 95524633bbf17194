//! Counter names shared by the caches, the resolver and telemetry.

pub(crate) const METRIC_POST_CACHE_POPULATE: &str = "ascii_site_post_cache_populate_total";
pub(crate) const METRIC_POST_CACHE_INVALIDATE: &str = "ascii_site_post_cache_invalidate_total";
pub(crate) const METRIC_REPO_CACHE_REFRESH: &str = "ascii_site_repo_cache_refresh_total";
pub(crate) const METRIC_REPO_FETCH_FAILURE: &str = "ascii_site_repo_fetch_failure_total";
