//! Natural-language text matching.
//!
//! Tokenization and English stemming shared by backends that do not
//! have a native full-text engine. A query matches a text when every query
//! term, after stemming, appears among the text's stemmed tokens.
//!
//! [`tokenize`] is also what backends with a native engine use to pull
//! indexable terms out of raw user input before building their own query
//! syntax.

use std::collections::HashSet;
use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};

/// Split text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Reduce a lowercase token to its English (Porter2) stem.
///
/// SQLite's `porter` tokenizer stems both sides of a `MATCH`, so the
/// in-memory engine stems with the same family of algorithm to agree on
/// e.g. `planning`/`plan` and `expenses`/`expense`.
pub fn stem(token: &str) -> String {
    english().stem(token).into_owned()
}

fn english() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

/// A compiled query: the stems every matching text must contain.
#[derive(Debug, Clone)]
pub struct Matcher {
    stems: Vec<String>,
}

impl Matcher {
    /// Compile a query. Returns `None` when it has no indexable terms,
    /// in which case nothing can match.
    pub fn new(query: &str) -> Option<Self> {
        let mut stems: Vec<String> = Vec::new();
        for token in tokenize(query) {
            let s = stem(&token);
            if !stems.contains(&s) {
                stems.push(s);
            }
        }
        if stems.is_empty() {
            None
        } else {
            Some(Self { stems })
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let text_stems: HashSet<String> = tokenize(text).iter().map(|t| stem(t)).collect();
        self.stems.iter().all(|s| text_stems.contains(s))
    }

    /// Match against several fields joined into one projection. Every term
    /// must appear, but the terms may be spread across the fields.
    pub fn is_match_any_of(&self, fields: &[&str]) -> bool {
        self.is_match(&fields.join(" "))
    }
}
