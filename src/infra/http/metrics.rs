//! Prometheus request counters served at `GET /metrics`.

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

use crate::infra::error::InfraError;

const SERVICE_LABEL: &str = "ascii-site";

/// Request counters in a private registry, scraped in text exposition format.
pub struct RequestMetrics {
    registry: Registry,
    total: IntCounter,
    plaintext: IntCounter,
    rss: IntCounter,
}

impl RequestMetrics {
    pub fn new() -> Result<Self, InfraError> {
        let registry = Registry::new();
        let total = register(
            &registry,
            "ascii_http_requests_total",
            "Total HTTP requests handled by ASCII Site.",
        )?;
        let plaintext = register(
            &registry,
            "ascii_plaintext_requests_total",
            "Total /text requests served.",
        )?;
        let rss = register(
            &registry,
            "ascii_rss_requests_total",
            "Total RSS feed requests served.",
        )?;

        Ok(Self {
            registry,
            total,
            plaintext,
            rss,
        })
    }

    /// Count one request; `/` and `/text` both serve the plain-text view.
    pub fn record(&self, path: &str) {
        self.total.inc();
        match path {
            "/" | "/text" => self.plaintext.inc(),
            "/feed" => self.rss.inc(),
            _ => {}
        }
    }

    pub fn render(&self) -> Result<String, InfraError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|err| InfraError::telemetry(format!("failed to encode metrics: {err}")))?;
        String::from_utf8(buffer)
            .map_err(|err| InfraError::telemetry(format!("metrics are not utf-8: {err}")))
    }
}

fn register(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, InfraError> {
    let opts = Opts::new(name, help).const_label("service", SERVICE_LABEL);
    let counter = IntCounter::with_opts(opts)
        .map_err(|err| InfraError::telemetry(format!("invalid counter {name}: {err}")))?;
    registry
        .register(Box::new(counter.clone()))
        .map_err(|err| InfraError::telemetry(format!("failed to register {name}: {err}")))?;
    Ok(counter)
}

pub async fn count_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    metrics.record(request.uri().path());
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_follow_the_requested_path() {
        let metrics = RequestMetrics::new().unwrap();
        metrics.record("/");
        metrics.record("/text");
        metrics.record("/feed");
        metrics.record("/api/posts");

        let text = metrics.render().unwrap();
        assert!(text.contains(
            "# HELP ascii_http_requests_total Total HTTP requests handled by ASCII Site."
        ));
        assert!(text.contains("# TYPE ascii_http_requests_total counter"));
        assert!(text.contains("ascii_http_requests_total{service=\"ascii-site\"} 4"));
        assert!(text.contains("ascii_plaintext_requests_total{service=\"ascii-site\"} 2"));
        assert!(text.contains("ascii_rss_requests_total{service=\"ascii-site\"} 1"));
    }

    #[test]
    fn registries_are_independent() {
        let first = RequestMetrics::new().unwrap();
        let second = RequestMetrics::new().unwrap();
        first.record("/feed");
        let untouched = second.render().unwrap();
        assert!(untouched.contains("ascii_rss_requests_total{service=\"ascii-site\"} 0"));
    }
}
