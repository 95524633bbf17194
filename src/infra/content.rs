//! Document sources backed by the file system or by memory.

use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;

use crate::application::{
    parser::RawDocument,
    sources::{DocumentSource, SourceError},
};

const MARKDOWN_EXTENSION: &str = "md";

/// Reads top-level `*.md` files from a directory.
#[derive(Debug, Clone)]
pub struct FileSystemDocumentSource {
    root: PathBuf,
}

impl FileSystemDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}

#[async_trait]
impl DocumentSource for FileSystemDocumentSource {
    async fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|err| {
            SourceError::unavailable(format!("{}: {err}", self.root.display()))
        })?;

        let mut origins = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| SourceError::unavailable(format!("{}: {err}", self.root.display())))?
        {
            let path = entry.path();
            if !is_markdown(&path) {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|kind| kind.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                origins.push(name.to_string());
            }
        }

        origins.sort();
        Ok(origins)
    }

    async fn read_document(&self, origin: &str) -> Result<RawDocument, SourceError> {
        let path = self.root.join(origin);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(RawDocument::new(origin, contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(SourceError::NotFound {
                origin: origin.to_string(),
            }),
            Err(source) => Err(SourceError::Io {
                origin: origin.to_string(),
                source,
            }),
        }
    }
}

/// Documents held in memory; used by tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryDocumentSource {
    documents: RwLock<BTreeMap<String, String>>,
}

impl InMemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, O, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (O, C)>,
        O: Into<String>,
        C: Into<String>,
    {
        let documents = documents
            .into_iter()
            .map(|(origin, contents)| (origin.into(), contents.into()))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn insert(&self, origin: impl Into<String>, contents: impl Into<String>) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(origin.into(), contents.into());
    }

    pub fn remove(&self, origin: &str) -> bool {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(origin)
            .is_some()
    }
}

#[async_trait]
impl DocumentSource for InMemoryDocumentSource {
    async fn list_documents(&self) -> Result<Vec<String>, SourceError> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }

    async fn read_document(&self, origin: &str) -> Result<RawDocument, SourceError> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(origin)
            .map(|contents| RawDocument::new(origin, contents.clone()))
            .ok_or_else(|| SourceError::NotFound {
                origin: origin.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_only_top_level_markdown_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();
        std::fs::write(dir.path().join("a.MD"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested.md")).unwrap();

        let source = FileSystemDocumentSource::new(dir.path());
        let origins = source.list_documents().await.unwrap();
        assert_eq!(origins, vec!["a.MD", "b.md"]);

        let raw = source.read_document("b.md").await.unwrap();
        assert_eq!(raw.contents, "b");
    }

    #[tokio::test]
    async fn missing_root_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSystemDocumentSource::new(dir.path().join("missing"));
        assert!(matches!(
            source.list_documents().await,
            Err(SourceError::Unavailable { .. })
        ));
        assert!(matches!(
            source.read_document("x.md").await,
            Err(SourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn in_memory_source_tracks_changes() {
        let source = InMemoryDocumentSource::with_documents([("a.md", "A")]);
        source.insert("b.md", "B");
        assert_eq!(source.list_documents().await.unwrap(), vec!["a.md", "b.md"]);
        assert!(source.remove("a.md"));
        assert_eq!(source.list_documents().await.unwrap(), vec!["b.md"]);
    }
}
