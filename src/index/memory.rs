//! In-memory vector store.

use std::collections::HashMap;

use crate::index::embed::Embedder;
use crate::index::{Collection, IndexDocument, StoreError, VectorStore};

/// Vector store that keeps its collection in memory only.
pub struct MemoryVectorStore<E: Embedder> {
    collection: Collection,
    embedder: E,
}

impl<E: Embedder> MemoryVectorStore<E> {
    #[must_use]
    pub fn new(collection: &str, embedder: E) -> Self {
        Self {
            collection: Collection::new(collection, &embedder),
            embedder,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &Collection {
        &self.collection
    }
}

impl<E: Embedder> VectorStore for MemoryVectorStore<E> {
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<(), StoreError> {
        self.collection.upsert(&self.embedder, documents);
        Ok(())
    }

    fn delete(&mut self, ids: &[String]) -> Result<(), StoreError> {
        self.collection.delete(ids);
        Ok(())
    }

    fn indexed_mtimes(&self) -> Result<HashMap<String, f64>, StoreError> {
        Ok(self.collection.mtimes())
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.collection.nearest(&self.embedder, text, k))
    }
}
