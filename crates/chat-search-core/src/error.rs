//! Errors surfaced by the search resolver.

/// Failure of a single [`search`](crate::resolver::HybridSearchResolver::search) call.
///
/// A call either returns a complete result list or exactly one of these;
/// partial results are never returned.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The owner identifier was present but empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller carried no owner identifier at all.
    #[error("unauthorized: request has no owner identifier")]
    Unauthorized,

    /// A store query failed in one of the passes. Not retried.
    #[error("search failed: {0}")]
    StoreUnavailable(#[source] anyhow::Error),
}
