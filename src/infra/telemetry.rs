use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::metrics::{
    METRIC_POST_CACHE_INVALIDATE, METRIC_POST_CACHE_POPULATE, METRIC_REPO_CACHE_REFRESH,
    METRIC_REPO_FETCH_FAILURE,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so `ascii-site text` can be piped.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_POST_CACHE_POPULATE,
            Unit::Count,
            "Total number of post snapshot populations."
        );
        describe_counter!(
            METRIC_POST_CACHE_INVALIDATE,
            Unit::Count,
            "Total number of post cache invalidations."
        );
        describe_counter!(
            METRIC_REPO_CACHE_REFRESH,
            Unit::Count,
            "Total number of repository cache refreshes."
        );
        describe_counter!(
            METRIC_REPO_FETCH_FAILURE,
            Unit::Count,
            "Total number of failed GitHub repository fetches."
        );
    });
}
