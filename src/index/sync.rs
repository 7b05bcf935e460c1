//! Incremental synchronization of a vector store with the notes directory.
//!
//! Each reconcile lists the notes with their modification times, compares
//! them with the mtimes stored in the index and then:
//!
//! 1. deletes records whose note is gone,
//! 2. re-embeds notes that are new or modified since they were indexed,
//!    flushing them in batches of [`UPSERT_BATCH_SIZE`].
//!
//! Nothing is carried between runs; the plan is recomputed every time.

use std::collections::{HashMap, HashSet};

use crate::index::{IndexDocument, StoreError, VectorStore};
use crate::notes::NoteStamp;
use crate::storage::NoteStorage;

/// Documents per upsert call.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Which notes to add, re-embed and delete.
///
/// `to_add` and `to_update` keep listing order; `to_delete` is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    pub to_add: Vec<String>,
    pub to_update: Vec<String>,
    pub to_delete: Vec<String>,
}

impl SyncPlan {
    /// Diff the current listing against indexed mtimes.
    ///
    /// A note is updated when `force` is set or its mtime is newer than the
    /// indexed one.
    #[must_use]
    pub fn compute(current: &[NoteStamp], indexed: &HashMap<String, f64>, force: bool) -> Self {
        let mut plan = SyncPlan::default();

        for stamp in current {
            match indexed.get(&stamp.filename) {
                None => plan.to_add.push(stamp.filename.clone()),
                Some(&stored) if force || stamp.mtime > stored => {
                    plan.to_update.push(stamp.filename.clone());
                }
                Some(_) => {}
            }
        }

        let on_disk: HashSet<&str> = current.iter().map(|s| s.filename.as_str()).collect();
        plan.to_delete = indexed
            .keys()
            .filter(|id| !on_disk.contains(id.as_str()))
            .cloned()
            .collect();
        plan.to_delete.sort();

        plan
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }
}

/// What one reconcile did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    /// Notes that could not be read and were left out.
    pub skipped: usize,
}

impl SyncReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == SyncReport::default()
    }
}

/// Keeps a vector store in step with a note storage.
pub struct IndexSynchronizer<'a, S: NoteStorage + ?Sized, V: VectorStore + ?Sized> {
    storage: &'a S,
    store: &'a mut V,
}

impl<'a, S: NoteStorage + ?Sized, V: VectorStore + ?Sized> IndexSynchronizer<'a, S, V> {
    pub fn new(storage: &'a S, store: &'a mut V) -> Self {
        Self { storage, store }
    }

    /// Bring the store up to date with the notes.
    ///
    /// An unreadable or empty notes directory leaves the store untouched.
    /// Notes that fail to read are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store fails; nothing is retried.
    pub fn reconcile(&mut self, force: bool) -> Result<SyncReport, StoreError> {
        let current = match self.storage.list_with_mtime() {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("{e}");
                return Ok(SyncReport::default());
            }
        };
        if current.is_empty() {
            return Ok(SyncReport::default());
        }

        let indexed = self.store.indexed_mtimes()?;
        let plan = SyncPlan::compute(&current, &indexed, force);
        let mut report = SyncReport::default();

        if plan.is_empty() {
            tracing::debug!(notes = current.len(), "Index is up to date");
            return Ok(report);
        }

        if !plan.to_delete.is_empty() {
            tracing::info!("Removing {} deleted notes from index", plan.to_delete.len());
            self.store.delete(&plan.to_delete)?;
            report.deleted = plan.to_delete.len();
        }

        let pending = plan.to_add.len() + plan.to_update.len();
        if pending == 0 {
            return Ok(report);
        }
        tracing::info!("Indexing {pending} notes");

        let mtimes: HashMap<&str, f64> = current
            .iter()
            .map(|s| (s.filename.as_str(), s.mtime))
            .collect();

        let staged = plan
            .to_add
            .iter()
            .map(|f| (f, true))
            .chain(plan.to_update.iter().map(|f| (f, false)));

        let mut batch = Vec::with_capacity(UPSERT_BATCH_SIZE);
        for (filename, is_new) in staged {
            let content = match self.storage.read_note_lossy(filename) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(%filename, "Error reading note: {e}");
                    report.skipped += 1;
                    continue;
                }
            };

            batch.push(IndexDocument {
                id: filename.clone(),
                content,
                mtime: mtimes.get(filename.as_str()).copied().unwrap_or_default(),
            });
            if is_new {
                report.added += 1;
            } else {
                report.updated += 1;
            }

            if batch.len() >= UPSERT_BATCH_SIZE {
                self.flush(&mut batch)?;
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch)?;
        }

        tracing::info!(
            added = report.added,
            updated = report.updated,
            deleted = report.deleted,
            skipped = report.skipped,
            "Index updated"
        );
        Ok(report)
    }

    fn flush(&mut self, batch: &mut Vec<IndexDocument>) -> Result<(), StoreError> {
        tracing::debug!(documents = batch.len(), "Flushing batch");
        self.store.upsert(batch)?;
        batch.clear();
        Ok(())
    }

    /// The `k` notes nearest to `query_text`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be queried.
    pub fn search(&self, query_text: &str, k: usize) -> Result<Vec<String>, StoreError> {
        self.store.query(query_text, k)
    }
}
