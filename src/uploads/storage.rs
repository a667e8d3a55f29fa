//! Excel Upload Storage
//!
//! Flat directory of uploaded spreadsheets. Every name coming from a request
//! is checked to be a single plain file name inside the root.

use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::CacheError;

/// File extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

/// Uploads of one name allowed within the same millisecond.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Errors that can occur while interacting with the upload directory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0}")]
    InvalidName(String),
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("uploaded file is empty")]
    EmptyPayload,
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("no free name left for {0}")]
    NameExhausted(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for CacheError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(_)
            | StorageError::UnsupportedType(_)
            | StorageError::EmptyPayload => CacheError::InvalidRequest(err.to_string()),
            StorageError::NotFound(name) => CacheError::NotFound(name),
            StorageError::NameExhausted(_) => CacheError::Internal(err.to_string()),
            StorageError::Io(err) => CacheError::Internal(err.to_string()),
        }
    }
}

/// Metadata describing one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

impl StoredFile {
    fn from_metadata(name: String, metadata: &Metadata) -> Self {
        Self {
            name,
            size_bytes: metadata.len(),
            modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
        }
    }
}

/// Filesystem-backed spreadsheet storage.
#[derive(Debug)]
pub struct ExcelStorage {
    root: PathBuf,
}

impl ExcelStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store an uploaded payload as `<unix millis>_<sanitized name>`.
    ///
    /// Existing files are never replaced; a name already taken gets a
    /// `-<n>` counter after the timestamp.
    pub async fn store(
        &self,
        original_name: &str,
        data: Bytes,
    ) -> Result<StoredFile, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let filename = sanitize_filename(original_name)?;
        let stamp = Utc::now().timestamp_millis();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{stamp}_{filename}")
            } else {
                format!("{stamp}-{attempt}_{filename}")
            };
            let path = self.resolve(&name)?;

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(StorageError::Io(err)),
            };
            file.write_all(&data).await?;
            file.flush().await?;

            let metadata = file.metadata().await?;
            info!(name = %name, size = data.len(), "Stored uploaded spreadsheet");
            return Ok(StoredFile::from_metadata(name, &metadata));
        }

        Err(StorageError::NameExhausted(filename))
    }

    /// List stored files, newest first.
    pub async fn list(&self) -> Result<Vec<StoredFile>, StorageError> {
        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            files.push(StoredFile::from_metadata(name, &metadata));
        }

        files.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(files)
    }

    /// Read a stored file into memory.
    pub async fn read(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.resolve(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Remove a stored file.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!(name, "Deleted uploaded spreadsheet");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(err) => Err(StorageError::Io(err)),
        }
    }

    /// Resolve a request-supplied name to a path directly under the root.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        let invalid = || StorageError::InvalidName(name.to_string());
        if name.starts_with('.') || name.contains('\\') {
            return Err(invalid());
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == OsStr::new(name) => {
                Ok(self.root.join(part))
            }
            _ => Err(invalid()),
        }
    }
}

/// Reduce a client-supplied file name to a safe ASCII name with an allowed extension.
fn sanitize_filename(original: &str) -> Result<String, StorageError> {
    // Browsers may send a full client-side path
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
        .trim();

    let path = Path::new(base);
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .filter(|value| ALLOWED_EXTENSIONS.contains(&value.as_str()))
        .ok_or_else(|| StorageError::UnsupportedType(original.to_string()))?;

    let stem: String = path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() { "upload" } else { stem };

    Ok(format!("{stem}.{extension}"))
}
