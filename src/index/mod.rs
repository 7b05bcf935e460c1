//! Semantic index: the vector store seam and the synchronizer that keeps it
//! in step with the notes directory.
//!
//! A store holds one record per note filename, carrying the note's `mtime`
//! at indexing time and an embedding of its content. Similarity is cosine.
//!
//! - [`local::LocalVectorStore`] persists a collection as JSON on disk
//! - [`memory::MemoryVectorStore`] keeps it in memory
//! - `fastembed::FastEmbedEmbedder` (feature `semantic`) embeds with a
//!   sentence-transformer model; [`embed::HashEmbedder`] is the fallback
//! - [`sync::IndexSynchronizer`] reconciles a store against a
//!   [`NoteStorage`](crate::storage::NoteStorage)

pub mod embed;
#[cfg(feature = "semantic")]
pub mod fastembed;
pub mod local;
pub mod memory;
pub mod sync;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::index::embed::{Embedder, cosine_similarity};

/// Similarity metric recorded with every collection.
pub const METRIC: &str = "cosine";

/// Errors that can occur in a vector store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Vector store unavailable: {0}")]
    Unavailable(String),

    #[error("Vector store is corrupt: {0}")]
    Corrupt(String),
}

/// A note staged for upsert: its filename, raw content and mtime.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    pub content: String,
    pub mtime: f64,
}

/// Trait for vector stores.
///
/// Implementations own embedding and ranking; callers deal only in
/// filenames, content and mtimes.
pub trait VectorStore {
    /// Insert or replace documents by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    fn upsert(&mut self, documents: &[IndexDocument]) -> Result<(), StoreError>;

    /// Remove documents by id. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    fn delete(&mut self, ids: &[String]) -> Result<(), StoreError>;

    /// Every indexed id with its stored mtime.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn indexed_mtimes(&self) -> Result<HashMap<String, f64>, StoreError>;

    /// The `k` ids most similar to `text`, best first.
    ///
    /// Returns an empty list if the store is empty or `text` cannot be
    /// embedded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    fn query(&self, text: &str, k: usize) -> Result<Vec<String>, StoreError>;
}

/// One stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub mtime: f64,
    pub embedding: Vec<f32>,
}

/// A named set of records embedded by one embedder.
///
/// This is the state both store implementations share, and the shape that
/// [`local::LocalVectorStore`] writes to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub metric: String,
    pub embedder: String,
    #[serde(default)]
    pub records: BTreeMap<String, IndexRecord>,
}

impl Collection {
    #[must_use]
    pub fn new(name: impl Into<String>, embedder: &dyn Embedder) -> Self {
        Self {
            name: name.into(),
            metric: METRIC.to_string(),
            embedder: embedder.id().to_string(),
            records: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embed and store documents, replacing existing records.
    ///
    /// A document that can't be embedded is stored with a zero vector so
    /// its mtime is still tracked; it never ranks above a real match.
    pub fn upsert(&mut self, embedder: &dyn Embedder, documents: &[IndexDocument]) {
        for doc in documents {
            let embedding = embedder.embed(&doc.content).unwrap_or_else(|e| {
                tracing::debug!(id = %doc.id, "Storing zero embedding: {e}");
                vec![0.0; embedder.dimension()]
            });
            self.records.insert(
                doc.id.clone(),
                IndexRecord {
                    mtime: doc.mtime,
                    embedding,
                },
            );
        }
    }

    pub fn delete(&mut self, ids: &[String]) {
        for id in ids {
            self.records.remove(id);
        }
    }

    #[must_use]
    pub fn mtimes(&self) -> HashMap<String, f64> {
        self.records
            .iter()
            .map(|(id, record)| (id.clone(), record.mtime))
            .collect()
    }

    /// Rank records by cosine similarity to `text`; ties go to the smaller id.
    #[must_use]
    pub fn nearest(&self, embedder: &dyn Embedder, text: &str, k: usize) -> Vec<String> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }

        let query = match embedder.embed(text) {
            Ok(query) => query,
            Err(e) => {
                tracing::debug!("Query not embeddable: {e}");
                return Vec::new();
            }
        };

        let mut scored: Vec<(&String, f32)> = self
            .records
            .iter()
            .map(|(id, record)| (id, cosine_similarity(&query, &record.embedding)))
            .collect();

        // records iterate in id order, so a stable sort breaks ties by id
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::embed::HashEmbedder;

    fn doc(id: &str, content: &str, mtime: f64) -> IndexDocument {
        IndexDocument {
            id: id.to_string(),
            content: content.to_string(),
            mtime,
        }
    }

    #[test]
    fn upsert_replaces_and_tracks_mtime() {
        let embedder = HashEmbedder::new(64);
        let mut collection = Collection::new("zettelkasten", &embedder);

        collection.upsert(&embedder, &[doc("a.md", "first", 1.0)]);
        collection.upsert(&embedder, &[doc("a.md", "second", 2.0)]);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.mtimes().get("a.md"), Some(&2.0));
    }

    #[test]
    fn delete_ignores_unknown_ids() {
        let embedder = HashEmbedder::new(64);
        let mut collection = Collection::new("zettelkasten", &embedder);
        collection.upsert(&embedder, &[doc("a.md", "first", 1.0)]);

        collection.delete(&["a.md".to_string(), "ghost.md".to_string()]);

        assert!(collection.is_empty());
    }

    #[test]
    fn nearest_prefers_shared_vocabulary() {
        let embedder = HashEmbedder::new(384);
        let mut collection = Collection::new("zettelkasten", &embedder);
        collection.upsert(
            &embedder,
            &[
                doc("rust.md", "rust ownership and borrowing rules", 1.0),
                doc("bread.md", "sourdough bread needs flour and water", 1.0),
                doc("empty.md", "", 1.0),
            ],
        );

        let results = collection.nearest(&embedder, "borrowing in rust", 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], "rust.md");
    }

    #[test]
    fn nearest_handles_degenerate_inputs() {
        let embedder = HashEmbedder::new(64);
        let mut collection = Collection::new("zettelkasten", &embedder);
        assert!(collection.nearest(&embedder, "anything", 5).is_empty());

        collection.upsert(&embedder, &[doc("a.md", "words here", 1.0)]);
        assert!(collection.nearest(&embedder, "words", 0).is_empty());
        assert!(collection.nearest(&embedder, "   ", 5).is_empty());
        assert_eq!(collection.nearest(&embedder, "words", 5), vec!["a.md"]);
    }

    #[test]
    fn records_cosine_metric() {
        let embedder = HashEmbedder::new(64);
        let collection = Collection::new("notes", &embedder);
        assert_eq!(collection.metric, "cosine");
        assert_eq!(collection.embedder, "fnv1a-64");
    }
}
