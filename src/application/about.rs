//! About page loader.
//!
//! The about file is read on every call; edits show up without a restart.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::application::{
    error::Cancelled,
    render::RenderService,
    sources::{DocumentSource, SourceError},
};
use crate::domain::{
    about::AboutContent,
    text::{ABOUT_SUMMARY_BUDGET, summarize},
};

const SOURCE: &str = "application::about";

pub struct AboutService {
    source: Arc<dyn DocumentSource>,
    origin: String,
    renderer: Arc<dyn RenderService>,
}

impl AboutService {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        origin: impl Into<String>,
        renderer: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            source,
            origin: origin.into(),
            renderer,
        }
    }

    /// Rendered about content, or [`AboutContent::empty`] when the file is
    /// missing or unreadable.
    pub async fn load(&self, cancel: &CancellationToken) -> Result<AboutContent, Cancelled> {
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Cancelled),
            read = self.source.read_document(&self.origin) => read,
        };

        let raw = match read {
            Ok(raw) => raw,
            Err(SourceError::NotFound { origin }) => {
                warn!(source = SOURCE, origin = %origin, "about content not found");
                return Ok(AboutContent::empty());
            }
            Err(err) => {
                warn!(source = SOURCE, error = %err, "failed to read about content");
                return Ok(AboutContent::empty());
            }
        };

        let html = match self.renderer.render(&raw.contents) {
            Ok(html) => html,
            Err(err) => {
                warn!(source = SOURCE, error = %err, "failed to render about content");
                return Ok(AboutContent::empty());
            }
        };

        Ok(AboutContent {
            summary: summarize(without_headings(&raw.contents).as_str(), ABOUT_SUMMARY_BUDGET),
            markdown: raw.contents,
            html,
        })
    }
}

/// Markdown with ATX heading lines removed, so the summary starts at prose.
fn without_headings(markdown: &str) -> String {
    markdown
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}
