use serde::Serialize;

/// Rendered about page plus a short summary for the plain-text view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AboutContent {
    pub markdown: String,
    pub html: String,
    pub summary: String,
}

impl AboutContent {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
    }
}
