//! Seams between the post cache and wherever documents come from.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::parser::RawDocument;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("document source unavailable: {message}")]
    Unavailable { message: String },
    #[error("document `{origin}` not found")]
    NotFound { origin: String },
    #[error("failed to read document `{origin}`: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Enumerates and reads raw documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Origin identifiers of every document currently available.
    async fn list_documents(&self) -> Result<Vec<String>, SourceError>;

    async fn read_document(&self, origin: &str) -> Result<RawDocument, SourceError>;
}

/// Receives "sources changed" signals from a watcher.
pub trait ChangeListener: Send + Sync {
    fn on_source_changed(&self);
}
