//! Staging area for uploads awaiting analysis.
//!
//! Every upload lands at a fresh `financial_document_<uuid>.<ext>` path. The
//! returned [`StagedFile`] owns that path and deletes it when released or
//! dropped, so the file goes away on every exit path of whoever holds it.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StagingError;
use crate::sanitize;

const FILE_PREFIX: &str = "financial_document_";
const DEFAULT_EXTENSION: &str = "pdf";
const KNOWN_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Debug, Clone)]
pub struct StagingArea {
    directory: PathBuf,
}

impl StagingArea {
    /// Creates the staging directory if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self, StagingError> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory).map_err(|e| StagingError::CreateDirectory {
            path: directory.clone(),
            source: e,
        })?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `content` verbatim to a new unique path.
    ///
    /// The extension follows `original_name` when it is one the extractors
    /// understand and falls back to `pdf` otherwise.
    pub fn stage(&self, content: &[u8], original_name: &str) -> Result<StagedFile, StagingError> {
        let extension = staged_extension(original_name);
        let file_name = format!("{}{}.{}", FILE_PREFIX, uuid::Uuid::new_v4(), extension);
        let path = self.directory.join(file_name);

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    StagingError::FileExists(path.clone())
                } else {
                    StagingError::WriteFile {
                        path: path.clone(),
                        source: e,
                    }
                }
            })?;

        // From here on the guard owns the path; a failed write removes it.
        let staged = StagedFile::adopt(path);
        file.write_all(content)
            .and_then(|_| file.sync_all())
            .map_err(|e| StagingError::WriteFile {
                path: staged.path().to_path_buf(),
                source: e,
            })?;

        debug!(
            file = %sanitize::redact_path(staged.path()),
            bytes = content.len(),
            "Staged upload"
        );
        Ok(staged)
    }
}

fn staged_extension(original_name: &str) -> &'static str {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => KNOWN_EXTENSIONS
            .iter()
            .find(|known| **known == ext)
            .copied()
            .unwrap_or(DEFAULT_EXTENSION),
        None => DEFAULT_EXTENSION,
    }
}

/// Exclusive owner of one staged file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    /// Takes ownership of an existing path.
    pub fn adopt(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file if it still exists. Safe to call any number of times;
    /// failures are logged and never returned.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(file = %sanitize::redact_path(&self.path), "Removed staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %sanitize::redact_path(&self.path), "Staged file already gone")
            }
            Err(e) => warn!(
                file = %sanitize::redact_path(&self.path),
                error = %e,
                "Failed to remove staged file"
            ),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.release();
    }
}
