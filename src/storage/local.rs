//! Local filesystem storage backend.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::notes::{NoteStamp, epoch_seconds, has_extension, validate_note_name};
use crate::storage::{NoteStorage, StorageError};

/// Storage backend for a flat notes directory on the local filesystem.
pub struct LocalStorage {
    root: PathBuf,
    extension: String,
}

impl LocalStorage {
    /// Create a new local storage backend rooted at the given directory.
    #[must_use]
    pub fn new(root: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            root,
            extension: extension.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory once, returning every note with its metadata.
    ///
    /// Subdirectories, non-note files and entries whose metadata can't be
    /// read are skipped.
    fn scan(&self) -> Result<Vec<(String, fs::Metadata)>, StorageError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            StorageError::DirectoryNotFound(format!("{}: {e}", self.root.display()))
        })?;

        let mut notes = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %self.root.display(), "Skipping unreadable entry: {e}");
                    continue;
                }
            };

            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            if !has_extension(&filename, &self.extension) {
                continue;
            }

            // fs::metadata follows symlinks, so a linked note counts as a
            // file and carries its target's times
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!(%filename, "Skipping note without metadata (dangling link?): {e}");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            notes.push((filename, metadata));
        }

        Ok(notes)
    }

    fn note_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        validate_note_name(filename).map_err(StorageError::InvalidName)?;
        Ok(self.root.join(filename))
    }

    fn read_bytes(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.note_path(filename)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(filename.to_string()),
            _ => StorageError::ReadError(format!("{}: {e}", path.display())),
        })
    }
}

impl NoteStorage for LocalStorage {
    fn list_by_access(&self) -> Result<Vec<String>, StorageError> {
        let mut notes: Vec<(String, SystemTime)> = self
            .scan()?
            .into_iter()
            .map(|(filename, metadata)| {
                let accessed = metadata.accessed().unwrap_or(SystemTime::UNIX_EPOCH);
                (filename, accessed)
            })
            .collect();

        // sort_by is stable, so equal access times keep listing order
        notes.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(notes.into_iter().map(|(filename, _)| filename).collect())
    }

    fn list_with_mtime(&self) -> Result<Vec<NoteStamp>, StorageError> {
        Ok(self
            .scan()?
            .into_iter()
            .map(|(filename, metadata)| {
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                NoteStamp::new(filename, epoch_seconds(modified))
            })
            .collect())
    }

    fn read_note(&self, filename: &str) -> Result<String, StorageError> {
        let bytes = self.read_bytes(filename)?;
        String::from_utf8(bytes)
            .map_err(|e| StorageError::ReadError(format!("{filename}: invalid UTF-8: {e}")))
    }

    fn read_note_lossy(&self, filename: &str) -> Result<String, StorageError> {
        let bytes = self.read_bytes(filename)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}
