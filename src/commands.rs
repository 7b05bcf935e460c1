//! Command implementations shared by CLI and MCP server.

use anyhow::Context;

use crate::config::Config;
use crate::index::embed::{Embedder, HashEmbedder};
use crate::index::local::LocalVectorStore;
use crate::index::sync::{IndexSynchronizer, SyncReport};
use crate::notes::strip_ending;
use crate::search::Query;
use crate::search::cascade::{CascadeEngine, CascadeOutcome, RenderStyle};
use crate::storage::local::LocalStorage;
use crate::storage::{NoteStorage, StorageError};

/// Maximum length of a query accepted from callers.
const MAX_QUERY_LENGTH: usize = 1000;

/// Outcome of a keyword search, with the query it was run for.
#[derive(Debug, Clone)]
pub struct KeywordResults {
    pub query: Query,
    pub outcome: CascadeOutcome,
}

impl KeywordResults {
    /// Tier headers and note names, one line each.
    #[must_use]
    pub fn lines(&self, extension: &str, style: RenderStyle) -> Vec<String> {
        self.outcome.render(&self.query, extension, style)
    }
}

fn open_storage(config: &Config) -> LocalStorage {
    LocalStorage::new(config.notes_dir(), config.notes.extension.clone())
}

/// The sentence-embedding model when built with `semantic`, else feature
/// hashing. A model that fails to load falls back to feature hashing.
fn embedder(config: &Config) -> Box<dyn Embedder> {
    #[cfg(feature = "semantic")]
    {
        let cache_dir = config.index_dir().join("models");
        match crate::index::fastembed::FastEmbedEmbedder::new(&cache_dir) {
            Ok(model) => return Box::new(model),
            Err(e) => tracing::warn!("Falling back to feature hashing: {e}"),
        }
    }
    Box::new(HashEmbedder::new(config.index.dimension))
}

fn open_store(config: &Config) -> anyhow::Result<LocalVectorStore<Box<dyn Embedder>>> {
    LocalVectorStore::open(&config.index_dir(), &config.index.collection, embedder(config))
        .context("Failed to open semantic index (`zkss index --force` rebuilds it)")
}

fn validate_query(text: &str) -> anyhow::Result<()> {
    if text.len() > MAX_QUERY_LENGTH {
        anyhow::bail!(
            "Query too long: {} chars (max {MAX_QUERY_LENGTH})",
            text.len()
        );
    }
    if text.contains('\0') {
        anyhow::bail!("Query contains invalid null byte");
    }
    Ok(())
}

/// Run the keyword cascade over the configured notes directory.
///
/// # Errors
///
/// Returns an error if no search words are given or the query is invalid.
/// A missing notes directory is logged and gives empty results.
pub fn keyword_search<S: AsRef<str>>(config: &Config, words: &[S]) -> anyhow::Result<KeywordResults> {
    let query = Query::from_words(words)?;
    validate_query(query.phrase())?;

    let storage = open_storage(config);
    let outcome = CascadeEngine::new(&storage).run(&query);

    Ok(KeywordResults { query, outcome })
}

/// Reconcile the semantic index, then return the `limit` nearest notes.
///
/// # Errors
///
/// Returns an error if the query is empty or invalid, or the index is
/// unavailable.
pub fn semantic_search(config: &Config, query: &str, limit: usize) -> anyhow::Result<Vec<String>> {
    if query.trim().is_empty() {
        anyhow::bail!("No search string given.");
    }
    validate_query(query)?;

    let storage = open_storage(config);
    let mut store = open_store(config)?;
    let mut sync = IndexSynchronizer::new(&storage, &mut store);

    sync.reconcile(false).context("Failed to update semantic index")?;
    sync.search(query, limit).context("Semantic search failed")
}

/// Reconcile the semantic index with the notes directory.
///
/// With `force`, every indexed note is re-embedded and a corrupt index is
/// discarded instead of reported.
///
/// # Errors
///
/// Returns an error if the index is unavailable.
pub fn reindex(config: &Config, force: bool) -> anyhow::Result<SyncReport> {
    let storage = open_storage(config);
    let mut store = if force {
        LocalVectorStore::open_or_reset(
            &config.index_dir(),
            &config.index.collection,
            embedder(config),
        )
        .context("Failed to open semantic index")?
    } else {
        open_store(config)?
    };

    IndexSynchronizer::new(&storage, &mut store)
        .reconcile(force)
        .context("Failed to update semantic index")
}

/// Read a note by filename.
///
/// # Errors
///
/// Returns `StorageError::NotFound` if there is no such note,
/// `StorageError::InvalidName` for names that are not plain filenames, or
/// `StorageError::ReadError` if the note can't be read.
pub fn read_note(config: &Config, filename: &str) -> Result<String, StorageError> {
    open_storage(config).read_note(filename)
}

/// Render semantic results as markdown list items, one per line:
/// `- **<name>** (<filename>)`.
#[must_use]
pub fn format_semantic_markdown(results: &[String], extension: &str) -> String {
    results
        .iter()
        .map(|filename| format!("- **{}** ({filename})", strip_ending(filename, extension)))
        .collect::<Vec<_>>()
        .join("\n")
}
