//! Storage abstraction for chat search.
//!
//! The [`ChatStore`] trait is the complete set of read queries the
//! resolver needs. Every query is scoped by an [`OwnerId`]; implementations
//! must never return rows belonging to another owner.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Conversation, ConversationMatch, OwnerId};

/// Read-only query contract over conversations, messages and documents.
///
/// "Matches" means a natural-language full-text predicate (tokenized,
/// stemmed, every term required) over the searchable projection of the
/// field(s) involved. Callers pass a query that is already trimmed and
/// non-empty; a query with no indexable terms matches nothing.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_conversations_by_title_or_message`](ChatStore::find_conversations_by_title_or_message) | Title OR any-message match, flagged per side |
/// | [`find_documents_by_text`](ChatStore::find_documents_by_text) | Document ids whose title + content match |
/// | [`find_conversations_referencing_documents`](ChatStore::find_conversations_referencing_documents) | Conversations whose messages mention a document id |
/// | [`list_conversations_by_owner`](ChatStore::list_conversations_by_owner) | All of an owner's conversations, newest first |
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Conversations owned by `owner` whose title matches `query` or that
    /// contain at least one matching message.
    ///
    /// Both predicates are evaluated for every returned row. Must be served
    /// by a single query, not one lookup per conversation.
    async fn find_conversations_by_title_or_message(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<ConversationMatch>>;

    /// Ids of documents owned by `owner` whose combined title and content
    /// match `query`.
    async fn find_documents_by_text(&self, owner: &OwnerId, query: &str) -> Result<Vec<String>>;

    /// Conversations owned by `owner` with at least one message whose
    /// rendered content contains any of `document_ids` as a substring.
    ///
    /// Each conversation is returned once.
    async fn find_conversations_referencing_documents(
        &self,
        owner: &OwnerId,
        document_ids: &[String],
    ) -> Result<Vec<Conversation>>;

    /// Every conversation owned by `owner`, ordered by creation time
    /// descending.
    async fn list_conversations_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>>;
}
