#![forbid(unsafe_code)]
//! Dataset repository: one JSON document on disk, loaded whole and replaced
//! atomically, with a serializing lock around every mutation.

use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use tidewatch_model::Dataset;

mod json_file;

pub use json_file::{BackupReceipt, JsonFileStore, StoreLockGuard};

pub const CRATE_NAME: &str = "tidewatch-store";

/// Default document file name under the data root.
pub const DATA_FILE_NAME: &str = "microplastic-data.json";
/// Backup directory name under the data root.
pub const BACKUP_DIR_NAME: &str = "backups";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    NotFound,
    Validation,
    Conflict,
    Corrupt,
    Io,
    Internal,
}

impl StoreErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
            Self::Conflict => "conflict",
            Self::Corrupt => "corrupt_document",
            Self::Io => "io_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Whole-document repository. `load` bootstraps the seed when the file is
/// absent; `save` replaces the file atomically; `lock` serializes
/// load-mutate-save sequences against this store and other processes.
#[async_trait]
pub trait DatasetRepository: Send + Sync + 'static {
    async fn load(&self) -> Result<Dataset, StoreError>;
    async fn save(&self, dataset: &Dataset) -> Result<(), StoreError>;
    async fn lock(&self) -> Result<StoreLockGuard, StoreError>;
    async fn backup(&self) -> Result<BackupReceipt, StoreError>;
}

/// Runs `mutate` under the repository lock: lock, load, mutate, save.
/// The closure's error aborts the sequence without saving.
pub async fn with_lock<R, F>(
    repo: &(impl DatasetRepository + ?Sized),
    mutate: F,
) -> Result<R, StoreError>
where
    F: FnOnce(&mut Dataset) -> Result<R, StoreError> + Send,
{
    let _guard = repo.lock().await?;
    let mut dataset = repo.load().await?;
    let out = mutate(&mut dataset)?;
    repo.save(&dataset).await?;
    Ok(out)
}
