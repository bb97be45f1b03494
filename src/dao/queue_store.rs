use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::debug;

use crate::dao::{
    models::QueueDocument,
    storage::{StorageError, StorageResult},
};

/// Abstraction over where the queue document lives.
///
/// Implementations always read and write the whole document.
pub trait QueueStore: Send + Sync {
    /// Read the whole document. A store that was never written loads as empty.
    fn load(&self) -> BoxFuture<'static, StorageResult<QueueDocument>>;
    /// Replace the whole document.
    fn save(&self, document: QueueDocument) -> BoxFuture<'static, StorageResult<()>>;
}

/// Queue document stored as a single pretty-printed JSON file.
///
/// Writes land in a sibling temp file that is then renamed over the original,
/// so a crash mid-write leaves the previous document intact.
#[derive(Clone, Debug)]
pub struct JsonFileQueueStore {
    path: Arc<Path>,
}

impl JsonFileQueueStore {
    /// Store backed by the file at `path`; the file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
        }
    }

    /// Location of the saved scores file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> StorageResult<QueueDocument> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved scores file yet");
                return Ok(QueueDocument::default());
            }
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read `{}`", self.path.display()),
                    err,
                ));
            }
        };

        // Only a missing file means an empty queue; a truncated one is corrupt.
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupted {
            path: self.path.to_path_buf(),
            source,
        })
    }

    async fn write(&self, document: &QueueDocument) -> StorageResult<()> {
        let json = serde_json::to_vec_pretty(document).map_err(|err| {
            StorageError::unavailable("failed to serialize saved scores".into(), err)
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|err| {
                StorageError::unavailable(format!("failed to create `{}`", parent.display()), err)
            })?;
        }

        let temp = self.temp_path();
        fs::write(&temp, json).await.map_err(|err| {
            StorageError::unavailable(format!("failed to write `{}`", temp.display()), err)
        })?;
        fs::rename(&temp, &self.path).await.map_err(|err| {
            StorageError::unavailable(format!("failed to replace `{}`", self.path.display()), err)
        })?;

        debug!(path = %self.path.display(), reports = document.len(), "saved scores written");
        Ok(())
    }
}

impl QueueStore for JsonFileQueueStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<QueueDocument>> {
        let store = self.clone();
        Box::pin(async move { store.read().await })
    }

    fn save(&self, document: QueueDocument) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.write(&document).await })
    }
}
