//! File-backed snapshot cache shared between processes.
//!
//! Each key maps to `<dir>/<key>.json`. Every write goes to its own uniquely
//! named temp file in the same directory, which is then renamed over the
//! target. Readers see the old snapshot or a new one in full, and concurrent
//! writers never touch each other's temp files. Keys cannot start with a dot,
//! so they never collide with the `.tmp*` names.

use async_trait::async_trait;
use bytes::Bytes;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::debug;

use super::SharedStore;
use crate::error::{BusError, Result};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            BusError::StorageUnavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(BusError::Config(format!(
                "store key {:?} is not usable as a file name",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl SharedStore for FileStore {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>> {
        let path = self.entry_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BusError::StorageUnavailable(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn store(&self, key: &str, snapshot: Bytes) -> Result<()> {
        let path = self.entry_path(key)?;
        let dir = self.dir.clone();
        let target = path.clone();
        let data = snapshot.clone();

        tokio::task::spawn_blocking(move || write_replacing(&dir, &target, &data))
            .await
            .map_err(|e| BusError::StorageUnavailable(format!("write task failed: {}", e)))?
            .map_err(|e| {
                BusError::StorageUnavailable(format!("cannot replace {}: {}", path.display(), e))
            })?;

        debug!("Stored {} bytes under {}", snapshot.len(), path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BusError::StorageUnavailable(format!(
                "cannot delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

fn write_replacing(dir: &Path, target: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(data)?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
