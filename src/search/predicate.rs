//! The predicate library: pure match functions over a lowercased filename or
//! lowercased note content.
//!
//! [`Predicate::CASCADE`] fixes the order in which the cascade applies them,
//! strictest first.

use std::collections::HashSet;
use std::fmt;

use crate::notes::strip_ending;
use crate::search::Query;

/// Characters that separate tokens for the "exact" predicates.
const BOUNDARY_CHARS: [char; 8] = [' ', '.', ',', '[', ']', '(', ')', '\n'];

/// Which part of a note a predicate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Filename,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Filename => f.write_str("filename"),
            Field::Content => f.write_str("content"),
        }
    }
}

/// One tier of the keyword cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    VeryExactFilename,
    ExactFilename,
    SubstringFilename,
    MultiWordFilename,
    ExactContent,
    SubstringContent,
    MultiWordExactContent,
    MultiWordContent,
}

impl Predicate {
    /// Evaluation order of the cascade.
    pub const CASCADE: [Predicate; 8] = [
        Predicate::VeryExactFilename,
        Predicate::ExactFilename,
        Predicate::SubstringFilename,
        Predicate::MultiWordFilename,
        Predicate::ExactContent,
        Predicate::SubstringContent,
        Predicate::MultiWordExactContent,
        Predicate::MultiWordContent,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Predicate::VeryExactFilename => "very-exact-filename",
            Predicate::ExactFilename => "exact-filename",
            Predicate::SubstringFilename => "substring-filename",
            Predicate::MultiWordFilename => "multi-word-filename",
            Predicate::ExactContent => "exact-content",
            Predicate::SubstringContent => "substring-content",
            Predicate::MultiWordExactContent => "multi-word-exact-content",
            Predicate::MultiWordContent => "multi-word-content",
        }
    }

    #[must_use]
    pub fn field(self) -> Field {
        match self {
            Predicate::VeryExactFilename
            | Predicate::ExactFilename
            | Predicate::SubstringFilename
            | Predicate::MultiWordFilename => Field::Filename,
            Predicate::ExactContent
            | Predicate::SubstringContent
            | Predicate::MultiWordExactContent
            | Predicate::MultiWordContent => Field::Content,
        }
    }

    /// Whether the predicate tests each query word separately.
    #[must_use]
    pub fn is_multi_word(self) -> bool {
        matches!(
            self,
            Predicate::MultiWordFilename
                | Predicate::MultiWordExactContent
                | Predicate::MultiWordContent
        )
    }

    /// Multi-word predicates only run for queries of two or more words.
    #[must_use]
    pub fn applies_to(self, query: &Query) -> bool {
        !self.is_multi_word() || query.is_multi_word()
    }

    /// How strictly the tier matched: "very exact", "exact" or plain.
    #[must_use]
    pub fn strictness(self) -> Option<&'static str> {
        match self {
            Predicate::VeryExactFilename => Some("very exact"),
            Predicate::ExactFilename
            | Predicate::ExactContent
            | Predicate::MultiWordExactContent => Some("exact"),
            Predicate::SubstringFilename
            | Predicate::MultiWordFilename
            | Predicate::SubstringContent
            | Predicate::MultiWordContent => None,
        }
    }

    /// Evaluate against a lowercased subject: the filename for filename
    /// predicates, the note content for content predicates.
    ///
    /// `extension` is only consulted by [`Predicate::VeryExactFilename`].
    #[must_use]
    pub fn evaluate(self, query: &Query, subject: &str, extension: &str) -> bool {
        match self {
            Predicate::VeryExactFilename => {
                very_exact_filename(subject, extension, query.phrase())
            }
            Predicate::ExactFilename | Predicate::ExactContent => {
                exact_token(subject, query.phrase())
            }
            Predicate::SubstringFilename | Predicate::SubstringContent => {
                subject.contains(query.phrase())
            }
            Predicate::MultiWordFilename | Predicate::MultiWordContent => {
                all_words_substring(subject, query.words())
            }
            Predicate::MultiWordExactContent => all_words_exact(subject, query.words()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn is_boundary(c: char) -> bool {
    BOUNDARY_CHARS.contains(&c)
}

/// Split text into tokens on the boundary character class.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_boundary).filter(|t| !t.is_empty())
}

/// Drop a leading date/ID prefix: a run of digits followed by one space.
///
/// Names without that shape come back unchanged.
#[must_use]
pub fn strip_id_prefix(name: &str) -> &str {
    name.trim_start_matches(|c: char| c.is_ascii_digit())
        .strip_prefix(' ')
        .unwrap_or(name)
}

/// The filename, minus extension and ID prefix, equals the phrase.
///
/// Unprefixed names are compared whole, so `rust.md` is very exact for
/// "rust"; the prefix is stripped only when present.
#[must_use]
pub fn very_exact_filename(filename: &str, extension: &str, phrase: &str) -> bool {
    strip_id_prefix(strip_ending(filename, extension)) == phrase
}

/// The phrase is one whole token of `text`.
#[must_use]
pub fn exact_token(text: &str, phrase: &str) -> bool {
    tokens(text).any(|t| t == phrase)
}

/// Every word occurs somewhere in `text`.
#[must_use]
pub fn all_words_substring<S: AsRef<str>>(text: &str, words: &[S]) -> bool {
    words.iter().all(|w| text.contains(w.as_ref()))
}

/// Every word is a token of `text`.
#[must_use]
pub fn all_words_exact<S: AsRef<str>>(text: &str, words: &[S]) -> bool {
    let token_set: HashSet<&str> = tokens(text).collect();
    words.iter().all(|w| token_set.contains(w.as_ref()))
}
