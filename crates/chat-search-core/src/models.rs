//! Core data models for chat search.
//!
//! Conversations, messages and documents are written by other subsystems
//! (chat creation, message persistence, document creation). The types here
//! are the read-side shapes exchanged between the resolver and the storage
//! backends, plus the ephemeral [`MatchType`] annotation.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Identifier of the user that owns conversations and documents.
///
/// Never empty. Every store query is scoped by one of these, so holding an
/// `OwnerId` is what allows a search to run at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Validate a raw owner identifier.
    ///
    /// Blank identifiers are rejected with [`SearchError::InvalidInput`].
    pub fn new(id: impl Into<String>) -> Result<Self, SearchError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SearchError::InvalidInput(
                "owner id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Build from the caller's identity as seen by the transport layer.
    ///
    /// `None` means the caller is not authenticated and yields
    /// [`SearchError::Unauthorized`].
    pub fn from_caller(id: Option<&str>) -> Result<Self, SearchError> {
        match id {
            Some(id) => Self::new(id),
            None => Err(SearchError::Unauthorized),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a conversation is shared beyond its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            other => bail!("unknown visibility: '{}'", other),
        }
    }
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            "tool" => Ok(Role::Tool),
            other => bail!("unknown message role: '{}'", other),
        }
    }
}

/// A chat conversation as returned in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub visibility: Visibility,
}

/// Message body: either plain text or structured parts.
///
/// Structured parts are how documents get attached to a message: the
/// collaborator that writes messages embeds the document id somewhere in
/// the part JSON. Reference lookup scans the [rendered](MessageContent::render)
/// string; full-text matching sees only [`MessageContent::searchable_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<serde_json::Value>),
}

impl MessageContent {
    /// The string form that is stored and scanned for document references.
    pub fn render(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => serde_json::Value::Array(parts.clone()).to_string(),
        }
    }
}

impl MessageContent {
    /// The words a reader sees: plain text as is, or the `text` fields of
    /// structured parts joined by newlines. This is what full-text matching
    /// runs against; part keys and embedded document ids are left out.
    pub fn searchable_text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

/// A stored document that messages may reference by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Why a conversation was returned by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Title,
    Message,
    Both,
    Document,
}

impl MatchType {
    /// Classify a row from the title/message pass.
    ///
    /// Returns `None` when neither side matched.
    pub fn from_flags(title_matched: bool, message_matched: bool) -> Option<Self> {
        match (title_matched, message_matched) {
            (true, true) => Some(MatchType::Both),
            (true, false) => Some(MatchType::Title),
            (false, true) => Some(MatchType::Message),
            (false, false) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Title => "title",
            MatchType::Message => "message",
            MatchType::Both => "both",
            MatchType::Document => "document",
        }
    }
}

/// A row from the title/message pass, flagged per side.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationMatch {
    pub conversation: Conversation,
    pub title_matched: bool,
    pub message_matched: bool,
}

/// One entry of the final result list.
///
/// Serializes as the conversation record with an optional `matchType`
/// field; listing-mode entries carry no `matchType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHit {
    #[serde(flatten)]
    pub conversation: Conversation,
    #[serde(
        rename = "matchType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub match_type: Option<MatchType>,
}

impl ConversationHit {
    pub fn new(conversation: Conversation, match_type: Option<MatchType>) -> Self {
        Self {
            conversation,
            match_type,
        }
    }
}
