//! FTS5 query construction.
//!
//! User input is never passed to `MATCH` verbatim: FTS5 has its own query
//! syntax (`AND`, `NEAR`, `*`, column filters, quotes) and arbitrary text
//! can be a syntax error. Terms are extracted with the shared tokenizer,
//! each one is quoted, and they are joined with spaces, which FTS5 reads as
//! an implicit AND. The table's `porter` tokenizer stems both sides.

use chat_search_core::text::tokenize;

/// Build a `MATCH` expression requiring every term of `query`.
///
/// Returns `None` when the query has no indexable terms; such a query
/// matches nothing and the caller should skip the database entirely.
pub fn match_expression(query: &str) -> Option<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in tokenize(query) {
        if !terms.contains(&token) {
            terms.push(token);
        }
    }

    if terms.is_empty() {
        return None;
    }

    Some(
        terms
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(" "),
    )
}
