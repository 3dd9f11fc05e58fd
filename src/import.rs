//! Fixture import.
//!
//! Loads conversations, messages and documents from a JSON file into the
//! SQLite store. In production these rows are written by the chat
//! subsystems; import exists to seed local databases and test setups.
//!
//! ```json
//! {
//!   "conversations": [{ "id": "c1", "ownerId": "u1", "title": "Budget Review",
//!                       "createdAt": "2024-05-01T10:00:00Z" }],
//!   "messages": [{ "conversationId": "c1", "role": "user", "content": "hi" }],
//!   "documents": [{ "id": "d1", "ownerId": "u1", "title": "Expense Report",
//!                   "content": "..." }]
//! }
//! ```
//!
//! Message ids are generated when omitted. `createdAt` defaults to the
//! import time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use chat_search_core::models::{
    Conversation, Document, Message, MessageContent, Role, Visibility,
};

use crate::sqlite_store::SqliteStore;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ImportFile {
    pub conversations: Vec<ConversationRecord>,
    pub messages: Vec<MessageRecord>,
    pub documents: Vec<DocumentRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: Option<String>,
    pub conversation_id: String,
    pub role: Role,
    pub content: MessageContent,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Counts of rows written by one import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportStats {
    pub conversations: usize,
    pub messages: usize,
    pub documents: usize,
}

pub fn read_import_file(path: &Path) -> Result<ImportFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {}", path.display()))
}

/// Write every record of `file` into `store`.
///
/// Conversations go first so messages can reference them.
pub async fn import_records(store: &SqliteStore, file: ImportFile) -> Result<ImportStats> {
    let now = Utc::now();
    let mut stats = ImportStats::default();

    for record in file.conversations {
        let conversation = Conversation {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            created_at: record.created_at.unwrap_or(now),
            visibility: record.visibility,
        };
        store.upsert_conversation(&conversation).await?;
        stats.conversations += 1;
    }

    for record in file.documents {
        let document = Document {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            content: record.content,
            created_at: record.created_at.unwrap_or(now),
        };
        store.upsert_document(&document).await?;
        stats.documents += 1;
    }

    for record in file.messages {
        let message = Message {
            id: record.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            conversation_id: record.conversation_id,
            role: record.role,
            content: record.content,
            created_at: record.created_at.unwrap_or(now),
        };
        store.upsert_message(&message).await?;
        stats.messages += 1;
    }

    tracing::info!(
        conversations = stats.conversations,
        messages = stats.messages,
        documents = stats.documents,
        "import complete"
    );
    Ok(stats)
}

/// CLI entry point for `chat-search import`.
pub async fn run_import(store: &SqliteStore, path: &Path) -> Result<()> {
    let file = read_import_file(path)?;
    let stats = import_records(store, file).await?;

    println!("import {}", path.display());
    println!("  conversations: {}", stats.conversations);
    println!("  messages: {}", stats.messages);
    println!("  documents: {}", stats.documents);
    println!("ok");
    Ok(())
}
