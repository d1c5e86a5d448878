//! JSON file backend: one pretty-printed document rewritten atomically.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use futures::future::BoxFuture;
use tokio::fs;
use tracing::{debug, info};

use crate::dao::{
    league_store::LeagueStore,
    models::LeagueDocument,
    storage::{StorageError, StorageResult},
};

/// Store keeping the league in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by `path`. Nothing is touched on disk until the first call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "league.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    async fn read_document(&self) -> StorageResult<LeagueDocument> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "league document not found; starting empty");
                return Ok(LeagueDocument::default());
            }
            Err(err) => return Err(self.io_error(&self.path, err)),
        };

        if contents.trim().is_empty() {
            info!(path = %self.path.display(), "league document is empty; starting empty");
            return Ok(LeagueDocument::default());
        }

        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupted {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_document(&self, document: LeagueDocument) -> StorageResult<()> {
        let contents = serde_json::to_vec_pretty(&document)
            .map_err(|source| StorageError::Serialize { source })?;

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(parent, source))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, &contents)
            .await
            .map_err(|source| self.io_error(&staging, source))?;
        fs::rename(&staging, &self.path)
            .await
            .map_err(|source| self.io_error(&self.path, source))?;

        debug!(path = %self.path.display(), bytes = contents.len(), "league document saved");
        Ok(())
    }
}

impl LeagueStore for JsonFileStore {
    fn load(&self) -> BoxFuture<'_, StorageResult<LeagueDocument>> {
        Box::pin(self.read_document())
    }

    fn save(&self, document: LeagueDocument) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(self.write_document(document))
    }
}
