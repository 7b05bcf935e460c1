//! Persisted vector store backed by a JSON file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::index::embed::Embedder;
use crate::index::{Collection, IndexDocument, StoreError, VectorStore};

/// Vector store persisted as `<dir>/<collection>.json`.
///
/// The file is loaded on open and rewritten after every mutating call.
pub struct LocalVectorStore<E: Embedder> {
    path: PathBuf,
    collection: Collection,
    embedder: E,
}

impl<E: Embedder> LocalVectorStore<E> {
    /// Open the named collection under `dir`, or start an empty one.
    ///
    /// A collection written by a different embedder is discarded so that
    /// the next reconcile re-embeds every note.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the file cannot be read and
    /// `StoreError::Corrupt` if it cannot be parsed.
    pub fn open(dir: &Path, collection: &str, embedder: E) -> Result<Self, StoreError> {
        let path = Self::collection_path(dir, collection);
        let loaded = Self::load(&path, &embedder)?;
        Ok(Self::with_collection(path, collection, loaded, embedder))
    }

    /// Like [`LocalVectorStore::open`], but a corrupt collection file is
    /// logged and replaced by an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the file cannot be read.
    pub fn open_or_reset(dir: &Path, collection: &str, embedder: E) -> Result<Self, StoreError> {
        let path = Self::collection_path(dir, collection);
        let loaded = match Self::load(&path, &embedder) {
            Err(StoreError::Corrupt(e)) => {
                tracing::warn!("Discarding corrupt index, rebuilding: {e}");
                None
            }
            other => other?,
        };
        Ok(Self::with_collection(path, collection, loaded, embedder))
    }

    fn collection_path(dir: &Path, collection: &str) -> PathBuf {
        dir.join(format!("{collection}.json"))
    }

    fn load(path: &Path, embedder: &E) -> Result<Option<Collection>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let stored: Collection = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;

        if stored.embedder == embedder.id() {
            Ok(Some(stored))
        } else {
            tracing::warn!(
                stored = %stored.embedder,
                current = %embedder.id(),
                "Index was built with a different embedder, rebuilding"
            );
            Ok(None)
        }
    }

    fn with_collection(
        path: PathBuf,
        name: &str,
        loaded: Option<Collection>,
        embedder: E,
    ) -> Self {
        let collection = loaded.unwrap_or_else(|| Collection::new(name, &embedder));
        Self {
            path,
            collection,
            embedder,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Rewrite the whole collection file.
    ///
    /// Each call serializes every record, so indexing N notes in batches of
    /// B writes on the order of N²/B records in total.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("create dir {}: {e}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string(&self.collection)
            .map_err(|e| StoreError::Unavailable(format!("serialize: {e}")))?;

        // Readers only ever see a complete file: write beside it, then rename.
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, contents)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", temp_path.display())))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

impl<E: Embedder> VectorStore for LocalVectorStore<E> {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<(), StoreError> {
        self.collection.upsert(&self.embedder, documents);
        self.persist()
    }

    fn delete(&mut self, ids: &[String]) -> Result<(), StoreError> {
        self.collection.delete(ids);
        self.persist()
    }

    fn indexed_mtimes(&self) -> Result<HashMap<String, f64>, StoreError> {
        Ok(self.collection.mtimes())
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.collection.nearest(&self.embedder, text, k))
    }
}
