//! In-memory [`ChatStore`] implementation for tests and embedded use.
//!
//! Rows live in `Vec`s behind `std::sync::RwLock`. Text matching uses
//! [`Matcher`](crate::text::Matcher), so behavior follows the same
//! tokenized, stemmed, all-terms-required rule as the SQLite backend.
//! Rows are kept in insertion order, which is the tie order for equal
//! timestamps.

use std::collections::HashSet;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Conversation, ConversationMatch, Document, Message, OwnerId};
use crate::text::Matcher;

use super::ChatStore;

struct StoredMessage {
    conversation_id: String,
    /// Full stored content, scanned for document references.
    rendered: String,
    /// Reader-visible words, matched against queries.
    searchable: String,
}

/// In-memory store for tests and embedded environments.
pub struct InMemoryStore {
    conversations: RwLock<Vec<Conversation>>,
    messages: RwLock<Vec<StoredMessage>>,
    documents: RwLock<Vec<Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn insert_conversation(&self, conversation: Conversation) -> Result<()> {
        self.conversations
            .write()
            .map_err(|_| poisoned())?
            .push(conversation);
        Ok(())
    }

    pub fn insert_message(&self, message: &Message) -> Result<()> {
        self.messages.write().map_err(|_| poisoned())?.push(StoredMessage {
            conversation_id: message.conversation_id.clone(),
            rendered: message.content.render(),
            searchable: message.content.searchable_text(),
        });
        Ok(())
    }

    pub fn insert_document(&self, document: Document) -> Result<()> {
        self.documents
            .write()
            .map_err(|_| poisoned())?
            .push(document);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn find_conversations_by_title_or_message(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<ConversationMatch>> {
        let matcher = match Matcher::new(query) {
            Some(m) => m,
            None => return Ok(Vec::new()),
        };

        let messages = self.messages.read().map_err(|_| poisoned())?;
        let message_hits: HashSet<&str> = messages
            .iter()
            .filter(|m| matcher.is_match(&m.searchable))
            .map(|m| m.conversation_id.as_str())
            .collect();

        let conversations = self.conversations.read().map_err(|_| poisoned())?;
        Ok(conversations
            .iter()
            .filter(|c| c.owner_id == owner.as_str())
            .filter_map(|c| {
                let title_matched = matcher.is_match(&c.title);
                let message_matched = message_hits.contains(c.id.as_str());
                if title_matched || message_matched {
                    Some(ConversationMatch {
                        conversation: c.clone(),
                        title_matched,
                        message_matched,
                    })
                } else {
                    None
                }
            })
            .collect())
    }

    async fn find_documents_by_text(&self, owner: &OwnerId, query: &str) -> Result<Vec<String>> {
        let matcher = match Matcher::new(query) {
            Some(m) => m,
            None => return Ok(Vec::new()),
        };

        let documents = self.documents.read().map_err(|_| poisoned())?;
        Ok(documents
            .iter()
            .filter(|d| d.owner_id == owner.as_str())
            .filter(|d| matcher.is_match_any_of(&[d.title.as_str(), d.content.as_str()]))
            .map(|d| d.id.clone())
            .collect())
    }

    async fn find_conversations_referencing_documents(
        &self,
        owner: &OwnerId,
        document_ids: &[String],
    ) -> Result<Vec<Conversation>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }

        let messages = self.messages.read().map_err(|_| poisoned())?;
        let referencing: HashSet<&str> = messages
            .iter()
            .filter(|m| document_ids.iter().any(|id| m.rendered.contains(id.as_str())))
            .map(|m| m.conversation_id.as_str())
            .collect();

        let conversations = self.conversations.read().map_err(|_| poisoned())?;
        Ok(conversations
            .iter()
            .filter(|c| c.owner_id == owner.as_str() && referencing.contains(c.id.as_str()))
            .cloned()
            .collect())
    }

    async fn list_conversations_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>> {
        let conversations = self.conversations.read().map_err(|_| poisoned())?;
        let mut owned: Vec<Conversation> = conversations
            .iter()
            .filter(|c| c.owner_id == owner.as_str())
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
