//! Integration tests for zkss library components.
//!
//! These tests wire the real on-disk storage and vector store together in
//! temporary directories, without going through the CLI.

use std::fs::{self, File, FileTimes};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Test helper to create a temporary notes directory.
struct TestNotes {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub index: PathBuf,
}

impl TestNotes {
    /// Create a new empty notes directory with a sibling index directory.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("notes");
        let index = temp_dir.path().join("index");
        fs::create_dir_all(&root).expect("Failed to create notes dir");

        Self {
            _temp_dir: temp_dir,
            root,
            index,
        }
    }

    /// Write a note with the given access and modification times, in seconds.
    fn note(&self, name: &str, content: impl AsRef<[u8]>, accessed: u64, modified: u64) {
        let path = self.root.join(name);
        fs::write(&path, content).expect("Failed to write note");

        let file = File::options()
            .write(true)
            .open(&path)
            .expect("Failed to open note");
        let at = |secs| SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        file.set_times(
            FileTimes::new()
                .set_accessed(at(accessed))
                .set_modified(at(modified)),
        )
        .expect("Failed to set times");
    }

    fn storage(&self) -> zkss::storage::local::LocalStorage {
        zkss::storage::local::LocalStorage::new(self.root.clone(), ".md".to_string())
    }
}

// =============================================================================
// Keyword Cascade Tests
// =============================================================================

mod cascade_tests {
    use super::*;
    use zkss::search::Query;
    use zkss::search::cascade::{CascadeEngine, RenderStyle};
    use zkss::search::predicate::Predicate;

    #[test]
    fn content_matches_follow_access_time() {
        let notes = TestNotes::new();
        notes.note("a.md", "hello world", 100, 100);
        notes.note("b.md", "hello there", 200, 100);

        let storage = notes.storage();
        let outcome = CascadeEngine::new(&storage).run(&Query::parse("hello").unwrap());

        assert_eq!(outcome.tiers.len(), 1);
        assert_eq!(outcome.tiers[0].predicate, Predicate::ExactContent);
        assert_eq!(outcome.tiers[0].filenames, vec!["b.md", "a.md"]);
    }

    #[test]
    fn tiers_partition_candidates() {
        let notes = TestNotes::new();
        notes.note("202101010000 My Note.md", "", 6, 1);
        notes.note("My Note 2.md", "", 5, 1);
        notes.note("Notebook.md", "see my note", 4, 1);
        notes.note("Other.md", "my notes on things", 3, 1);
        notes.note("Scattered.md", "note that my cat is here", 2, 1);
        notes.note("Empty.md", "", 1, 1);

        let storage = notes.storage();
        let outcome = CascadeEngine::new(&storage).run(&Query::parse("my note").unwrap());

        let tiers: Vec<(Predicate, Vec<&str>)> = outcome
            .tiers
            .iter()
            .map(|t| (t.predicate, t.filenames.iter().map(String::as_str).collect()))
            .collect();

        assert_eq!(
            tiers,
            vec![
                (Predicate::VeryExactFilename, vec!["202101010000 My Note.md"]),
                (Predicate::SubstringFilename, vec!["My Note 2.md"]),
                (Predicate::SubstringContent, vec!["Notebook.md", "Other.md"]),
                (Predicate::MultiWordExactContent, vec!["Scattered.md"]),
            ]
        );
        assert_eq!(outcome.unmatched, vec!["Empty.md"]);
        assert_eq!(outcome.matched_count() + outcome.unmatched.len(), 6);
    }

    #[test]
    fn undecodable_note_is_skipped() {
        let notes = TestNotes::new();
        notes.note("bad.md", [0xff, 0xfe, b'r', b'u', b's', b't'], 2, 1);
        notes.note("good.md", "rust", 1, 1);

        let storage = notes.storage();
        let outcome = CascadeEngine::new(&storage).run(&Query::parse("rust").unwrap());

        assert_eq!(outcome.tiers.len(), 1);
        assert_eq!(outcome.tiers[0].filenames, vec!["good.md"]);
        assert_eq!(outcome.unmatched, vec!["bad.md"]);
    }

    #[test]
    fn markdown_render_bolds_field() {
        let notes = TestNotes::new();
        notes.note("Rust.md", "", 1, 1);

        let storage = notes.storage();
        let query = Query::parse("rust").unwrap();
        let outcome = CascadeEngine::new(&storage).run(&query);

        assert_eq!(
            outcome.render(&query, ".md", RenderStyle::Markdown),
            vec!["- \"rust\" very exact in **filename:**", "    Rust"]
        );
    }
}

// =============================================================================
// Index Synchronization Tests
// =============================================================================

mod sync_tests {
    use super::*;
    use zkss::index::VectorStore;
    use zkss::index::embed::HashEmbedder;
    use zkss::index::local::LocalVectorStore;
    use zkss::index::sync::IndexSynchronizer;

    fn open_store(notes: &TestNotes) -> LocalVectorStore<HashEmbedder> {
        LocalVectorStore::open(&notes.index, "zettelkasten", HashEmbedder::default()).unwrap()
    }

    #[test]
    fn modified_note_is_reembedded() {
        let notes = TestNotes::new();
        notes.note("a.md", "alpha", 1, 1000);
        notes.note("b.md", "beta", 1, 1000);

        let storage = notes.storage();
        let mut store = open_store(&notes);
        let first = IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();
        assert_eq!(first.added, 2);

        notes.note("a.md", "alpha revised", 1, 2000);

        let mut store = open_store(&notes);
        let second = IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();

        assert_eq!(second.added, 0);
        assert_eq!(second.updated, 1);
        assert_eq!(
            store.indexed_mtimes().unwrap().get("a.md"),
            Some(&2000.0)
        );
    }

    #[test]
    fn deleted_note_leaves_index() {
        let notes = TestNotes::new();
        notes.note("a.md", "alpha", 1, 1000);
        notes.note("b.md", "beta", 1, 1000);

        let storage = notes.storage();
        let mut store = open_store(&notes);
        IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();

        fs::remove_file(notes.root.join("b.md")).unwrap();

        let mut store = open_store(&notes);
        let report = IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();

        assert_eq!(report.deleted, 1);
        let mtimes = store.indexed_mtimes().unwrap();
        assert!(mtimes.contains_key("a.md"));
        assert!(!mtimes.contains_key("b.md"));
    }

    #[test]
    fn second_run_is_noop() {
        let notes = TestNotes::new();
        for i in 0..5 {
            notes.note(&format!("{i}.md"), format!("note {i}"), 1, 1000 + i);
        }

        let storage = notes.storage();
        let mut store = open_store(&notes);
        IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();

        let mut store = open_store(&notes);
        let report = IndexSynchronizer::new(&storage, &mut store)
            .reconcile(false)
            .unwrap();

        assert!(report.is_noop());
    }

    #[test]
    fn lossy_content_is_indexed() {
        let notes = TestNotes::new();
        notes.note("bad.md", [b'r', b'u', b's', b't', b' ', 0xff], 1, 1000);

        let storage = notes.storage();
        let mut store = open_store(&notes);
        let mut sync = IndexSynchronizer::new(&storage, &mut store);
        let report = sync.reconcile(false).unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(sync.search("rust", 5).unwrap(), vec!["bad.md"]);
    }

    #[test]
    fn semantic_query_ranks_by_similarity() {
        let notes = TestNotes::new();
        notes.note("rust.md", "rust ownership borrowing", 1, 1000);
        notes.note("bread.md", "sourdough flour water", 1, 1000);

        let storage = notes.storage();
        let mut store = open_store(&notes);
        let mut sync = IndexSynchronizer::new(&storage, &mut store);
        sync.reconcile(false).unwrap();

        let results = sync.search("borrowing in rust", 2).unwrap();
        assert_eq!(results[0], "rust.md");
        assert_eq!(results.len(), 2);
        assert!(sync.search("borrowing", 0).unwrap().is_empty());
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_tests {
    use std::path::PathBuf;
    use zkss::config::{Config, expand_tilde};

    #[test]
    fn expand_tilde_with_home_prefix() {
        let expanded = expand_tilde("~/zettelkasten");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("zettelkasten"));
    }

    #[test]
    fn expand_tilde_absolute_path_unchanged() {
        assert_eq!(expand_tilde("/tmp/notes"), PathBuf::from("/tmp/notes"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = Config::parse("[search]\nlimit = 5\n").unwrap();

        assert_eq!(config.search.limit, 5);
        assert_eq!(config.notes.extension, ".md");
        assert_eq!(config.index.collection, "zettelkasten");
    }
}
