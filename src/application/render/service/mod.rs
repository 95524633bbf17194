mod config;

use std::sync::Arc;

use comrak::{Arena, format_html, parse_document};
use once_cell::sync::Lazy;

use crate::application::render::types::{RenderError, RenderService};

use config::{build_sanitizer, default_options};

/// Comrak-based rendering pipeline with Ammonia sanitisation.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    sanitizer: ammonia::Builder<'static>,
}

impl ComrakRenderService {
    /// Construct a renderer with the GFM extensions enabled.
    fn new() -> Self {
        Self {
            options: default_options(),
            sanitizer: build_sanitizer(),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> =
    Lazy::new(|| Arc::new(ComrakRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for ComrakRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, markdown, &self.options);

        let mut html = String::new();
        format_html(root, &self.options, &mut html).map_err(|err| RenderError::Markdown {
            message: err.to_string(),
        })?;

        Ok(self.sanitizer.clean(&html).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_gfm_tables_and_emphasis() {
        let html = render_service()
            .render("| a | b |\n|---|---|\n| 1 | 2 |\n\n*hi* ~~old~~")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<em>hi</em>"));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn strips_scripts_and_event_handlers() {
        let html = render_service()
            .render("<script>alert(1)</script>\n\n<p onclick=\"x()\">safe</p>")
            .unwrap();
        assert!(!html.contains("<script"));
        assert!(!html.contains("onclick"));
        assert!(html.contains("safe"));
    }

    #[test]
    fn task_lists_keep_their_classes() {
        let html = render_service().render("- [x] done\n- [ ] todo").unwrap();
        assert!(html.contains("task-list-item"));
        assert!(html.contains("checked"));
    }
}
