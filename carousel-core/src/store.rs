//! Document persistence.
//!
//! The editor core never touches storage directly. Hosts hand documents to a
//! [`DocumentStore`]: [`MemoryStore`] keeps them in a map, [`FileStore`]
//! writes one pretty JSON file per document into a data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::document::CarouselDocument;
use crate::migrate;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The document id cannot be used as a storage key.
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),
}

/// Storage for whole documents, keyed by document id.
///
/// Saving the same document twice is harmless; the second save overwrites
/// the first. Deleting a missing document is not an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist `doc` under `id`, replacing any previous version.
    async fn save(&self, id: &str, doc: &CarouselDocument) -> Result<(), StoreError>;

    /// Fetch the document stored under `id`.
    async fn load(&self, id: &str) -> Result<Option<CarouselDocument>, StoreError>;

    /// Remove the document stored under `id`.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Ids of every stored document, sorted.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}

fn check_id(id: &str) -> Result<(), StoreError> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, CarouselDocument>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, id: &str, doc: &CarouselDocument) -> Result<(), StoreError> {
        check_id(id)?;
        let mut stored = doc.clone();
        stored.touch();
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.to_string(), stored);
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<CarouselDocument>, StoreError> {
        Ok(self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self
            .documents
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// One `<id>.json` file per document inside a data directory.
///
/// Loaded files go through [`migrate::migrate`], so documents written by
/// older versions (or edited by hand) come back normalized.
///
/// Ids are used as file names verbatim: only alphanumerics, `-` and `_` are
/// accepted, anything else is [`StoreError::InvalidId`].
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the data directory. It is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `id`.
    #[must_use]
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_filename(id)))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn save(&self, id: &str, doc: &CarouselDocument) -> Result<(), StoreError> {
        check_file_id(id)?;
        let mut stored = doc.clone();
        stored.touch();
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::info!(document_id = id, path = %path.display(), "Document saved");
        Ok(())
    }

    async fn load(&self, id: &str) -> Result<Option<CarouselDocument>, StoreError> {
        check_file_id(id)?;
        let path = self.path_for(id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let document = migrate::migrate_str(&contents).map_err(|e| {
            tracing::warn!(document_id = id, path = %path.display(), "Failed to load document: {e}");
            StoreError::Serialization(e.to_string())
        })?;
        tracing::info!(
            document_id = id,
            slides = document.slides.len(),
            "Document loaded"
        );
        Ok(Some(document))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        check_file_id(id)?;
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(document_id = id, "Document deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn check_file_id(id: &str) -> Result<(), StoreError> {
    check_id(id)?;
    if sanitize_filename(id) != id {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Replace any character that is not alphanumeric, `-` or `_` with `_`.
fn sanitize_filename(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CarouselDocument;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my-doc_1"), "my-doc_1");
        assert_eq!(sanitize_filename("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_filename("a b.c"), "a_b_c");
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        let doc = CarouselDocument::new_editable("d1").with_title("Dicas");
        store.save("d1", &doc).await.expect("save");
        store.save("d1", &doc).await.expect("second save");
        assert_eq!(store.len(), 1);

        let loaded = store.load("d1").await.expect("load").expect("present");
        assert_eq!(loaded.title, "Dicas");
        assert_eq!(loaded.slides, doc.slides);
        assert!(store.load("missing").await.expect("load").is_none());

        store.delete("d1").await.expect("delete");
        store.delete("d1").await.expect("delete twice");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let store = MemoryStore::new();
        let doc = CarouselDocument::new_editable("d");
        let result = store.save("  ", &doc).await;
        assert!(matches!(result, Err(StoreError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path().join("docs"));
        let mut doc = CarouselDocument::new_editable("post-1").with_title("Olá");
        doc.updated_at = "2000-01-01T00:00:00.000Z".into();

        store.save("post-1", &doc).await.expect("save");
        assert!(store.path_for("post-1").exists());

        let loaded = store.load("post-1").await.expect("load").expect("present");
        assert_eq!(loaded.title, "Olá");
        assert_eq!(loaded.slides, doc.slides);
        assert_ne!(loaded.updated_at, doc.updated_at);

        assert_eq!(store.list().await.expect("list"), vec!["post-1".to_string()]);
        store.delete("post-1").await.expect("delete");
        assert!(store.load("post-1").await.expect("load").is_none());
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_ids_that_are_not_file_names() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path());
        let doc = CarouselDocument::new_editable("d");

        for id in ["a/b", "../escape", "a b", "post.json"] {
            let result = store.save(id, &doc).await;
            assert!(matches!(result, Err(StoreError::InvalidId(_))), "{id}");
            assert!(matches!(store.load(id).await, Err(StoreError::InvalidId(_))), "{id}");
        }
        store.save("a_b", &doc).await.expect("save");
        assert!(matches!(store.delete("a/b").await, Err(StoreError::InvalidId(_))));
        assert_eq!(store.list().await.expect("list"), vec!["a_b".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_list_missing_dir() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path().join("nope"));
        assert!(store.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_file_store_migrates_on_load() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path());
        let raw = r#"{"version": 0, "title": "Velho", "slides": [{"layout": "nope", "elements": []}]}"#;
        std::fs::write(store.path_for("old"), raw).expect("write");

        let loaded = store.load("old").await.expect("load").expect("present");
        assert_eq!(loaded.title, "Velho");
        assert_eq!(loaded.slides.len(), 1);
        assert_eq!(loaded.slides[0].layout(), crate::slide::SlideLayout::TitleBody);
    }

    #[tokio::test]
    async fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileStore::new(dir.path());
        std::fs::write(store.path_for("bad"), "not json").expect("write");
        let result = store.load("bad").await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
