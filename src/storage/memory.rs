//! In-memory storage backend.

use crate::notes::{NoteStamp, has_extension};
use crate::storage::{NoteStorage, StorageError};

#[derive(Debug, Clone)]
struct MemoryNote {
    filename: String,
    content: Vec<u8>,
    accessed: f64,
    modified: f64,
}

/// Storage backend that keeps notes in memory.
///
/// Insertion order stands in for directory listing order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    notes: Vec<MemoryNote>,
    extension: String,
    unreadable: Vec<String>,
    missing: bool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            ..Self::default()
        }
    }

    /// A storage whose directory does not exist.
    #[must_use]
    pub fn missing(extension: impl Into<String>) -> Self {
        Self {
            missing: true,
            ..Self::new(extension)
        }
    }

    /// Add or replace a note with explicit access and modification times.
    pub fn insert(
        &mut self,
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        accessed: f64,
        modified: f64,
    ) {
        let filename = filename.into();
        let note = MemoryNote {
            filename: filename.clone(),
            content: content.into(),
            accessed,
            modified,
        };
        match self.notes.iter_mut().find(|n| n.filename == filename) {
            Some(existing) => *existing = note,
            None => self.notes.push(note),
        }
    }

    /// Builder form of [`MemoryStorage::insert`].
    #[must_use]
    pub fn with_note(
        mut self,
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        accessed: f64,
        modified: f64,
    ) -> Self {
        self.insert(filename, content, accessed, modified);
        self
    }

    pub fn remove(&mut self, filename: &str) {
        self.notes.retain(|n| n.filename != filename);
    }

    /// Update a note's modification time.
    pub fn touch(&mut self, filename: &str, modified: f64) {
        if let Some(note) = self.notes.iter_mut().find(|n| n.filename == filename) {
            note.modified = modified;
        }
    }

    /// Make reads of `filename` fail as if permission were denied.
    pub fn deny_read(&mut self, filename: impl Into<String>) {
        self.unreadable.push(filename.into());
    }

    fn listed(&self) -> Result<impl Iterator<Item = &MemoryNote>, StorageError> {
        if self.missing {
            return Err(StorageError::DirectoryNotFound("<memory>".to_string()));
        }
        Ok(self
            .notes
            .iter()
            .filter(|n| has_extension(&n.filename, &self.extension)))
    }

    fn bytes(&self, filename: &str) -> Result<&[u8], StorageError> {
        if self.unreadable.iter().any(|f| f == filename) {
            return Err(StorageError::ReadError(format!(
                "{filename}: permission denied"
            )));
        }
        self.notes
            .iter()
            .find(|n| n.filename == filename)
            .map(|n| n.content.as_slice())
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))
    }
}

impl NoteStorage for MemoryStorage {
    fn list_by_access(&self) -> Result<Vec<String>, StorageError> {
        let mut notes: Vec<&MemoryNote> = self.listed()?.collect();
        notes.sort_by(|a, b| b.accessed.total_cmp(&a.accessed));
        Ok(notes.into_iter().map(|n| n.filename.clone()).collect())
    }

    fn list_with_mtime(&self) -> Result<Vec<NoteStamp>, StorageError> {
        Ok(self
            .listed()?
            .map(|n| NoteStamp::new(n.filename.clone(), n.modified))
            .collect())
    }

    fn read_note(&self, filename: &str) -> Result<String, StorageError> {
        let bytes = self.bytes(filename)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| StorageError::ReadError(format!("{filename}: invalid UTF-8: {e}")))
    }

    fn read_note_lossy(&self, filename: &str) -> Result<String, StorageError> {
        let bytes = self.bytes(filename)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn extension(&self) -> &str {
        &self.extension
    }
}
