//! Hybrid conversation search.
//!
//! Resolves `(owner, query)` into the owner's conversations that match by
//! title, by message content, or through a referenced document, each tagged
//! with a [`MatchType`]. The resolver operates entirely through the
//! [`ChatStore`] trait and never writes.
//!
//! # Query plan
//!
//! 1. Title/message pass: one store round-trip, flagged per side.
//! 2. Document discovery: ids of the owner's matching documents. Issued
//!    together with pass 1 unless [`ResolverOptions::concurrent_discovery`]
//!    is off.
//! 3. Document-to-conversation pass: only when step 2 found something.
//!    Conversations already produced by pass 1 are dropped.
//! 4. Merge and stable-sort by `created_at` descending.
//!
//! An empty (or whitespace-only) query skips all of this and lists the
//! owner's conversations with no annotation.
//!
//! Passes do not share a snapshot: a message written between pass 1 and
//! pass 3 may or may not be observed.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::SearchError;
use crate::models::{Conversation, ConversationHit, ConversationMatch, MatchType, OwnerId};
use crate::store::ChatStore;

/// Tuning knobs for [`HybridSearchResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Issue the title/message pass and document discovery concurrently.
    pub concurrent_discovery: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            concurrent_discovery: true,
        }
    }
}

/// The hybrid search resolver. Holds the store handle it was built with;
/// build it once per process and share it.
pub struct HybridSearchResolver<S> {
    store: S,
    options: ResolverOptions,
}

impl<S: ChatStore> HybridSearchResolver<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ResolverOptions::default())
    }

    pub fn with_options(store: S, options: ResolverOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run a search for `owner`.
    ///
    /// Returns each matching conversation at most once, newest first. Any
    /// store failure fails the whole call with
    /// [`SearchError::StoreUnavailable`].
    #[tracing::instrument(name = "search", skip(self, owner, query), fields(owner = %owner))]
    pub async fn search(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<ConversationHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_all(owner).await;
        }

        let (matches, document_ids) = if self.options.concurrent_discovery {
            futures::try_join!(
                self.title_or_message_pass(owner, query),
                self.document_discovery_pass(owner, query),
            )?
        } else {
            let matches = self.title_or_message_pass(owner, query).await?;
            let document_ids = self.document_discovery_pass(owner, query).await?;
            (matches, document_ids)
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut hits: Vec<ConversationHit> = Vec::with_capacity(matches.len());

        for row in matches {
            let match_type = match MatchType::from_flags(row.title_matched, row.message_matched) {
                Some(t) => t,
                None => continue,
            };
            if let Some(conversation) = owned_by(owner, row.conversation) {
                if seen.insert(conversation.id.clone()) {
                    hits.push(ConversationHit::new(conversation, Some(match_type)));
                }
            }
        }

        if document_ids.is_empty() {
            debug!(hits = hits.len(), "no matching documents, skipping reference pass");
        } else {
            let referencing = self
                .store
                .find_conversations_referencing_documents(owner, &document_ids)
                .await
                .map_err(SearchError::StoreUnavailable)?;
            let candidates = referencing.len();

            for conversation in referencing {
                if let Some(conversation) = owned_by(owner, conversation) {
                    if seen.insert(conversation.id.clone()) {
                        hits.push(ConversationHit::new(
                            conversation,
                            Some(MatchType::Document),
                        ));
                    }
                }
            }
            debug!(
                documents = document_ids.len(),
                candidates,
                hits = hits.len(),
                "reference pass done"
            );
        }

        sort_newest_first(&mut hits);
        Ok(hits)
    }

    async fn list_all(&self, owner: &OwnerId) -> Result<Vec<ConversationHit>, SearchError> {
        let conversations = self
            .store
            .list_conversations_by_owner(owner)
            .await
            .map_err(SearchError::StoreUnavailable)?;
        debug!(count = conversations.len(), "empty query, listing conversations");

        let mut hits: Vec<ConversationHit> = conversations
            .into_iter()
            .filter_map(|c| owned_by(owner, c))
            .map(|c| ConversationHit::new(c, None))
            .collect();
        sort_newest_first(&mut hits);
        Ok(hits)
    }

    async fn title_or_message_pass(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<ConversationMatch>, SearchError> {
        let rows = self
            .store
            .find_conversations_by_title_or_message(owner, query)
            .await
            .map_err(SearchError::StoreUnavailable)?;
        debug!(rows = rows.len(), "title/message pass done");
        Ok(rows)
    }

    async fn document_discovery_pass(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<String>, SearchError> {
        let ids = self
            .store
            .find_documents_by_text(owner, query)
            .await
            .map_err(SearchError::StoreUnavailable)?;
        debug!(documents = ids.len(), "document discovery done");
        Ok(ids)
    }
}

/// Drop rows a misbehaving store returned for another owner.
fn owned_by(owner: &OwnerId, conversation: Conversation) -> Option<Conversation> {
    if conversation.owner_id == owner.as_str() {
        Some(conversation)
    } else {
        warn!(
            conversation_id = %conversation.id,
            "store returned a conversation owned by someone else, dropping it"
        );
        None
    }
}

/// Stable, so equal timestamps keep the order the store produced.
fn sort_newest_first(hits: &mut [ConversationHit]) {
    hits.sort_by(|a, b| b.conversation.created_at.cmp(&a.conversation.created_at));
}
