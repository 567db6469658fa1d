//! Document store backed by one JSON file per document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{DocPath, Document, DocumentStore};

/// Stores `users/{uid}/calendar/{key}` as `{root}/users/{uid}/calendar/{key}.json`.
///
/// The root directory must already exist. A missing root (e.g. an unmounted
/// drive) is reported as [`StoreError::Unavailable`] rather than recreated.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &DocPath) -> StoreResult<PathBuf> {
        let segments = path.segments();
        let Some((last, parents)) = segments.split_last() else {
            return Err(StoreError::InvalidPath(String::new()));
        };

        let mut file_path = self.root.clone();
        for segment in parents {
            validate_segment(segment)?;
            file_path.push(segment);
        }
        validate_segment(last)?;
        file_path.push(format!("{}.json", last));

        Ok(file_path)
    }

    async fn ensure_root(&self) -> StoreResult<()> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Err(StoreError::Unavailable(format!(
                "{}: {}",
                self.root.display(),
                e
            ))),
        }
    }
}

/// Reject anything that could escape the store root.
fn validate_segment(segment: &str) -> StoreResult<()> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);

    if invalid {
        return Err(StoreError::InvalidPath(segment.to_string()));
    }
    Ok(())
}

impl DocumentStore for FileStore {
    async fn read(&self, path: &DocPath) -> StoreResult<Option<Document>> {
        let file_path = self.file_path(path)?;
        self.ensure_root().await?;

        let content = match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                // Unreadable documents count as absent; the next save replaces them.
                warn!(path = %path, error = %e, "discarding malformed document");
                Ok(None)
            }
        }
    }

    async fn write(&self, path: &DocPath, doc: &Document) -> StoreResult<()> {
        let file_path = self.file_path(path)?;
        self.ensure_root().await?;

        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp_path = file_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &file_path).await?;

        debug!(path = %path, "document written");
        Ok(())
    }
}
