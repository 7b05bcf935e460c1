//! Keyword search: the query type, the predicate library and the cascade.

pub mod cascade;
pub mod predicate;

/// Errors raised while building a query.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("No search string given.")]
    Empty,
}

/// A lowercased keyword query.
///
/// `phrase` is the words joined by single spaces; `words` is the phrase split
/// on whitespace. Both are lowercased once here so predicates never have to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    phrase: String,
    words: Vec<String>,
}

impl Query {
    /// Build a query from separately supplied words (e.g. CLI arguments).
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Empty` if no non-blank word is supplied.
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self, QueryError> {
        let joined = words
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(&joined)
    }

    /// Build a query from free text, normalizing runs of whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Empty` if the text is blank.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let lowered = text.to_lowercase();
        let words: Vec<String> = lowered.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self {
            phrase: words.join(" "),
            words,
        })
    }

    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn is_multi_word(&self) -> bool {
        self.words.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins() {
        let query = Query::from_words(&["Rust", "OWNERSHIP"]).unwrap();
        assert_eq!(query.phrase(), "rust ownership");
        assert_eq!(query.words(), ["rust", "ownership"]);
        assert!(query.is_multi_word());
    }

    #[test]
    fn collapses_whitespace() {
        let query = Query::parse("  my \t note  ").unwrap();
        assert_eq!(query.phrase(), "my note");
    }

    #[test]
    fn single_word() {
        let query = Query::parse("hello").unwrap();
        assert!(!query.is_multi_word());
    }

    #[test]
    fn empty_query_rejected() {
        assert_eq!(Query::parse("   "), Err(QueryError::Empty));
        assert_eq!(Query::from_words::<&str>(&[]), Err(QueryError::Empty));
        assert_eq!(
            QueryError::Empty.to_string(),
            "No search string given."
        );
    }
}
