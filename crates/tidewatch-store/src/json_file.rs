// SPDX-License-Identifier: Apache-2.0

use crate::{StoreError, StoreErrorCode, BACKUP_DIR_NAME, DATA_FILE_NAME};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tidewatch_model::{filename_stamp, now_iso8601, seed_dataset, Dataset};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

/// Serializes mutating sequences. Holds the in-process mutex for its
/// lifetime and removes the on-disk lock file on drop.
#[derive(Debug)]
pub struct StoreLockGuard {
    lock_path: PathBuf,
    _permit: OwnedMutexGuard<()>,
}

impl Drop for StoreLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

/// Outcome of a backup: file name under the backup directory, size and
/// content digest of the written bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReceipt {
    pub file_name: String,
    pub bytes_written: u64,
    pub sha256_hex: String,
}

/// Production repository: one pretty-printed JSON document under a data
/// root, replaced atomically on save.
pub struct JsonFileStore {
    data_root: PathBuf,
    data_path: PathBuf,
    lock_path: PathBuf,
    backup_dir: PathBuf,
    write_mutex: Arc<Mutex<()>>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(data_root: PathBuf) -> Self {
        let data_path = data_root.join(DATA_FILE_NAME);
        let lock_path = data_root.join(format!("{DATA_FILE_NAME}.lock"));
        let backup_dir = data_root.join(BACKUP_DIR_NAME);
        Self {
            data_root,
            data_path,
            lock_path,
            backup_dir,
            write_mutex: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Serializes and writes the document as-is: tmp sibling, fsync, rename
    /// over the target, fsync the directory.
    async fn write_document(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(dataset)
            .map_err(|e| StoreError::new(StoreErrorCode::Internal, e.to_string()))?;
        tokio::fs::create_dir_all(&self.data_root)
            .await
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;

        let tmp_path = self.data_root.join(format!("{DATA_FILE_NAME}.tmp"));
        write_and_sync(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.data_path)
            .await
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
        sync_dir(&self.data_root).await
    }

    /// Synthesizes the seed document, persists it and returns it. The
    /// returned value is exactly what landed on disk.
    async fn bootstrap(&self) -> Result<Dataset, StoreError> {
        let now = now_iso8601();
        let dataset = seed_dataset(&now);
        self.write_document(&dataset).await?;
        info!(path = %self.data_path.display(), "store file absent, seed dataset created");
        Ok(dataset)
    }
}

#[async_trait]
impl crate::DatasetRepository for JsonFileStore {
    async fn load(&self) -> Result<Dataset, StoreError> {
        let bytes = match tokio::fs::read(&self.data_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.bootstrap().await,
            Err(e) => return Err(StoreError::new(StoreErrorCode::Io, e.to_string())),
        };
        let dataset: Dataset = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::new(StoreErrorCode::Corrupt, e.to_string()))?;
        dataset
            .validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Corrupt, e.to_string()))?;
        Ok(dataset)
    }

    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let mut stamped = dataset.clone();
        stamped.metadata.last_updated = now_iso8601();
        self.write_document(&stamped).await
    }

    async fn lock(&self) -> Result<StoreLockGuard, StoreError> {
        let permit = Arc::clone(&self.write_mutex).lock_owned().await;
        tokio::fs::create_dir_all(&self.data_root)
            .await
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await
        {
            Ok(_) => Ok(StoreLockGuard {
                lock_path: self.lock_path.clone(),
                _permit: permit,
            }),
            Err(e) => {
                warn!(path = %self.lock_path.display(), "store lock contended: {e}");
                Err(StoreError::new(
                    StoreErrorCode::Conflict,
                    format!("failed to acquire store lock: {e}"),
                ))
            }
        }
    }

    async fn backup(&self) -> Result<BackupReceipt, StoreError> {
        let dataset = self.load().await?;
        let bytes = serde_json::to_vec_pretty(&dataset)
            .map_err(|e| StoreError::new(StoreErrorCode::Internal, e.to_string()))?;
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;

        let file_name = format!("backup-{}.json", filename_stamp(&now_iso8601()));
        let backup_path = self.backup_dir.join(&file_name);
        write_and_sync(&backup_path, &bytes).await?;

        let digest = sha256_hex(&bytes);
        info!(file = %file_name, bytes = bytes.len(), "dataset backup created");
        Ok(BackupReceipt {
            file_name,
            bytes_written: bytes.len() as u64,
            sha256_hex: digest,
        })
    }
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
    file.write_all(bytes)
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))
}

async fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    let file = tokio::fs::File::open(dir)
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))?;
    file.sync_all()
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Io, e.to_string()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
