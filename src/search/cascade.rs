//! The keyword cascade.
//!
//! Notes start as one candidate list ordered by most recent access. Each
//! predicate in [`Predicate::CASCADE`] splits the remaining candidates into
//! the notes it matches, which become that predicate's tier, and the rest,
//! which move on to the next predicate. A note therefore lands in the
//! strictest tier it satisfies, or in no tier at all.

use crate::notes::strip_ending;
use crate::search::Query;
use crate::search::predicate::{Field, Predicate};
use crate::storage::NoteStorage;

/// Indentation for note names under a tier header.
const NAME_INDENT: &str = "    ";

/// The notes claimed by one predicate, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTier {
    pub predicate: Predicate,
    pub filenames: Vec<String>,
}

/// How tier headers are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    /// Plain text for terminals.
    #[default]
    Plain,
    /// Markdown with the matched field in bold.
    Markdown,
}

impl MatchTier {
    /// Header line naming what matched and where, e.g.
    /// `- "rust" exact in filename:`.
    #[must_use]
    pub fn header(&self, query: &Query, style: RenderStyle) -> String {
        let subject = if self.predicate.is_multi_word() {
            query
                .words()
                .iter()
                .map(|w| format!("\"{w}\""))
                .collect::<Vec<_>>()
                .join(" and ")
        } else {
            format!("\"{}\"", query.phrase())
        };

        let place = match self.predicate.strictness() {
            Some(strictness) => format!("{strictness} in"),
            None => "in".to_string(),
        };

        let field = self.predicate.field();
        match style {
            RenderStyle::Plain => format!("- {subject} {place} {field}:"),
            RenderStyle::Markdown => format!("- {subject} {place} **{field}:**"),
        }
    }

    /// Member names with the note extension removed.
    #[must_use]
    pub fn display_names<'a>(&'a self, extension: &str) -> Vec<&'a str> {
        self.filenames
            .iter()
            .map(|f| strip_ending(f, extension))
            .collect()
    }
}

/// Result of one cascade run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Non-empty tiers in cascade order.
    pub tiers: Vec<MatchTier>,
    /// Candidates no predicate claimed, in candidate order.
    pub unmatched: Vec<String>,
}

impl CascadeOutcome {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Total number of matched notes across all tiers.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.tiers.iter().map(|t| t.filenames.len()).sum()
    }

    /// Render every tier as a header followed by indented note names.
    #[must_use]
    pub fn render(&self, query: &Query, extension: &str, style: RenderStyle) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.tiers.len() + self.matched_count());
        for tier in &self.tiers {
            lines.push(tier.header(query, style));
            for name in tier.display_names(extension) {
                lines.push(format!("{NAME_INDENT}{name}"));
            }
        }
        lines
    }
}

/// Runs the keyword cascade against a note storage.
pub struct CascadeEngine<'a, S: NoteStorage + ?Sized> {
    storage: &'a S,
}

impl<'a, S: NoteStorage + ?Sized> CascadeEngine<'a, S> {
    #[must_use]
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Enumerate notes by access time and classify them.
    ///
    /// A missing or unreadable notes directory is logged and yields an
    /// empty outcome.
    #[must_use]
    pub fn run(&self, query: &Query) -> CascadeOutcome {
        let candidates = match self.storage.list_by_access() {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("{e}");
                Vec::new()
            }
        };
        self.classify(query, candidates)
    }

    /// Classify an explicit candidate list, keeping its order within tiers.
    #[must_use]
    pub fn classify(&self, query: &Query, candidates: Vec<String>) -> CascadeOutcome {
        let extension = self.storage.extension().to_lowercase();
        let mut remaining = candidates;
        let mut tiers = Vec::new();

        for predicate in Predicate::CASCADE {
            if remaining.is_empty() {
                break;
            }
            if !predicate.applies_to(query) {
                continue;
            }

            let (matched, rest): (Vec<String>, Vec<String>) = remaining
                .into_iter()
                .partition(|filename| self.matches(predicate, query, filename, &extension));

            tracing::debug!(
                tier = %predicate,
                matched = matched.len(),
                remaining = rest.len(),
                "Cascade tier evaluated"
            );

            if !matched.is_empty() {
                tiers.push(MatchTier {
                    predicate,
                    filenames: matched,
                });
            }
            remaining = rest;
        }

        CascadeOutcome {
            tiers,
            unmatched: remaining,
        }
    }

    fn matches(&self, predicate: Predicate, query: &Query, filename: &str, extension: &str) -> bool {
        match predicate.field() {
            Field::Filename => predicate.evaluate(query, &filename.to_lowercase(), extension),
            // Content is re-read for every content tier, never cached.
            Field::Content => match self.storage.read_note(filename) {
                Ok(content) => predicate.evaluate(query, &content.to_lowercase(), extension),
                Err(e) => {
                    tracing::warn!(%filename, tier = %predicate, "Skipping note: {e}");
                    false
                }
            },
        }
    }
}
