use thiserror::Error;

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("markdown formatting failed: {message}")]
    Markdown { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs or errors.
pub trait RenderService: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}
