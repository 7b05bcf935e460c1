//! Note storage trait and implementations.
//!
//! This is the seam between the search engines and wherever notes live.
//! [`local::LocalStorage`] reads a flat directory on disk;
//! [`memory::MemoryStorage`] holds notes in memory so the engines can be
//! exercised without a filesystem.

pub mod local;
pub mod memory;

use crate::notes::NoteStamp;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Notes directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Invalid note name: {0}")]
    InvalidName(String),
}

/// Trait for note storage backends.
pub trait NoteStorage: Send + Sync {
    /// List note filenames, most recently accessed first.
    ///
    /// Only regular files ending in [`NoteStorage::extension`] are listed.
    /// Ties keep the underlying listing order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DirectoryNotFound` if the notes cannot be listed.
    fn list_by_access(&self) -> Result<Vec<String>, StorageError>;

    /// List notes with their modification times, in listing order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DirectoryNotFound` if the notes cannot be listed.
    fn list_with_mtime(&self) -> Result<Vec<NoteStamp>, StorageError>;

    /// Read a note as strict UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the note does not exist and
    /// `StorageError::ReadError` on permission or decode failures.
    fn read_note(&self, filename: &str) -> Result<String, StorageError>;

    /// Read a note, replacing invalid UTF-8 sequences.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` or `StorageError::ReadError` as
    /// for [`NoteStorage::read_note`], but never fails on decoding.
    fn read_note_lossy(&self, filename: &str) -> Result<String, StorageError>;

    /// The filename suffix that marks a note (e.g. ".md").
    fn extension(&self) -> &str;
}
