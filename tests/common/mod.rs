//! Shared fixture for the SQLite-backed tests.
//!
//! Owner `u1`:
//! - `c1` "Budget Review" (title match for "budget")
//! - `c2` "Notes", message "quarterly budget numbers" (message match)
//! - `c3` "Budget Notes", message "budget plan" (both)
//! - `c4` "Monthly sync", message embedding document `d1`
//! - `c5` "Travel", message "booking the flights"
//!
//! Owner `u2`:
//! - `x1` "Budget for u2", message "budget"
//! - `x2` "Shared attachment", message embedding `d1`
//!
//! Documents: `d1` (u1) "Expense Report", `d2` (u2) "Expense Report".

#![allow(dead_code)]

use chat_search::db;
use chat_search::migrate;
use chat_search::sqlite_store::SqliteStore;
use chat_search_core::models::{
    Conversation, Document, Message, MessageContent, Role, Visibility,
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, n, 10, 0, 0).unwrap()
}

pub fn conversation(id: &str, owner: &str, title: &str, created_at: DateTime<Utc>) -> Conversation {
    Conversation {
        id: id.to_string(),
        owner_id: owner.to_string(),
        title: title.to_string(),
        created_at,
        visibility: Visibility::Private,
    }
}

pub fn message(id: &str, conversation_id: &str, content: MessageContent) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        role: Role::User,
        content,
        created_at: day(1),
    }
}

pub fn document(id: &str, owner: &str, title: &str, content: &str) -> Document {
    Document {
        id: id.to_string(),
        owner_id: owner.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        created_at: day(1),
    }
}

pub fn doc_ref(document_id: &str) -> MessageContent {
    MessageContent::Parts(vec![
        serde_json::json!({ "type": "text", "text": "attached" }),
        serde_json::json!({ "type": "document", "documentId": document_id }),
    ])
}

/// A fresh, migrated database in a temp directory.
pub async fn empty_pool() -> (TempDir, SqlitePool) {
    let tmp = TempDir::new().unwrap();
    let pool = db::connect_path(&tmp.path().join("data/chat.sqlite"), 5)
        .await
        .unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    (tmp, pool)
}

/// The fixture rows, in insertion order.
pub fn fixture_rows() -> (Vec<Conversation>, Vec<Message>, Vec<Document>) {
    let conversations = vec![
        conversation("c1", "u1", "Budget Review", day(1)),
        conversation("c2", "u1", "Notes", day(2)),
        conversation("c3", "u1", "Budget Notes", day(3)),
        conversation("c4", "u1", "Monthly sync", day(4)),
        conversation("c5", "u1", "Travel", day(5)),
        conversation("x1", "u2", "Budget for u2", day(6)),
        conversation("x2", "u2", "Shared attachment", day(7)),
    ];
    let messages = vec![
        message("m1", "c1", "let's go over it".into()),
        message("m2", "c2", "quarterly budget numbers".into()),
        message("m3", "c3", "budget plan".into()),
        message("m4", "c4", doc_ref("d1")),
        message("m5", "c5", "booking the flights".into()),
        message("m6", "x1", "budget".into()),
        message("m7", "x2", doc_ref("d1")),
    ];
    let documents = vec![
        document("d1", "u1", "Expense Report", "travel and meals"),
        document("d2", "u2", "Expense Report", "someone else's"),
    ];
    (conversations, messages, documents)
}

pub async fn seed(store: &SqliteStore) {
    let (conversations, messages, documents) = fixture_rows();
    for c in &conversations {
        store.upsert_conversation(c).await.unwrap();
    }
    for m in &messages {
        store.upsert_message(m).await.unwrap();
    }
    for d in &documents {
        store.upsert_document(d).await.unwrap();
    }
}

/// Migrated and seeded store.
pub async fn seeded_store() -> (TempDir, SqliteStore) {
    let (tmp, pool) = empty_pool().await;
    let store = SqliteStore::new(pool);
    seed(&store).await;
    (tmp, store)
}

pub const FIXTURE_JSON: &str = r#"{
  "conversations": [
    { "id": "c1", "ownerId": "u1", "title": "Budget Review", "createdAt": "2024-05-01T10:00:00Z" },
    { "id": "c2", "ownerId": "u1", "title": "Notes", "createdAt": "2024-05-02T10:00:00Z" },
    { "id": "c3", "ownerId": "u1", "title": "Budget Notes", "createdAt": "2024-05-03T10:00:00Z" },
    { "id": "c4", "ownerId": "u1", "title": "Monthly sync", "createdAt": "2024-05-04T10:00:00Z" },
    { "id": "x1", "ownerId": "u2", "title": "Budget for u2", "createdAt": "2024-05-06T10:00:00Z" }
  ],
  "messages": [
    { "conversationId": "c1", "role": "user", "content": "let's go over it" },
    { "conversationId": "c2", "role": "user", "content": "quarterly budget numbers" },
    { "conversationId": "c3", "role": "assistant", "content": "budget plan" },
    { "conversationId": "c4", "role": "user",
      "content": [{ "type": "text", "text": "attached" }, { "type": "document", "documentId": "d1" }] },
    { "conversationId": "x1", "role": "user", "content": "budget" }
  ],
  "documents": [
    { "id": "d1", "ownerId": "u1", "title": "Expense Report", "content": "travel and meals" }
  ]
}"#;
