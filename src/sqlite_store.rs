//! SQLite-backed [`ChatStore`] implementation.
//!
//! Full-text matching runs against the FTS5 projections created by
//! [`migrate`](crate::migrate); timestamps are stored as Unix milliseconds.
//! Document references are found by substring containment of the document
//! id in the stored (rendered) message content, since that is how the
//! message writer embeds attachments. The message FTS projection holds
//! only the text parts, so part keys and ids never match a query.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use chat_search_core::models::{Conversation, ConversationMatch, Document, Message, OwnerId};
use chat_search_core::store::ChatStore;

use crate::fts::match_expression;

/// SQLite implementation of the [`ChatStore`] trait.
///
/// Wraps a [`SqlitePool`]; clone the pool, not the store, to share it.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or replace a conversation and its title projection.
    pub async fn upsert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO conversations (id, owner_id, title, created_at, visibility)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                title = excluded.title,
                created_at = excluded.created_at,
                visibility = excluded.visibility
            "#,
        )
        .bind(&conversation.id)
        .bind(&conversation.owner_id)
        .bind(&conversation.title)
        .bind(conversation.created_at.timestamp_millis())
        .bind(conversation.visibility.as_str())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM conversations_fts WHERE conversation_id = ?")
            .bind(&conversation.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO conversations_fts (conversation_id, title) VALUES (?, ?)")
            .bind(&conversation.id)
            .bind(&conversation.title)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Insert or replace a message and its content projection.
    ///
    /// The base row keeps the rendered content (document references are
    /// found there); the FTS row gets only the reader-visible text. The
    /// parent conversation must already exist.
    pub async fn upsert_message(&self, message: &Message) -> Result<()> {
        let rendered = message.content.render();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                conversation_id = excluded.conversation_id,
                role = excluded.role,
                content = excluded.content,
                created_at = excluded.created_at
            "#,
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(message.role.as_str())
        .bind(&rendered)
        .bind(message.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to write message {}", message.id))?;

        sqlx::query("DELETE FROM messages_fts WHERE message_id = ?")
            .bind(&message.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO messages_fts (message_id, conversation_id, content) VALUES (?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.conversation_id)
        .bind(message.content.searchable_text())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Insert or replace a document and its title + content projection.
    pub async fn upsert_document(&self, document: &Document) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, owner_id, title, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                title = excluded.title,
                content = excluded.content,
                created_at = excluded.created_at
            "#,
        )
        .bind(&document.id)
        .bind(&document.owner_id)
        .bind(&document.title)
        .bind(&document.content)
        .bind(document.created_at.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM documents_fts WHERE document_id = ?")
            .bind(&document.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO documents_fts (document_id, title, content) VALUES (?, ?, ?)")
            .bind(&document.id)
            .bind(&document.title)
            .bind(&document.content)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("timestamp out of range: {}", ms))
}

fn conversation_from_row(row: &SqliteRow) -> Result<Conversation> {
    let created_at: i64 = row.try_get("created_at")?;
    let visibility: String = row.try_get("visibility")?;
    Ok(Conversation {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        created_at: from_millis(created_at)?,
        visibility: visibility.parse()?,
    })
}

#[async_trait]
impl ChatStore for SqliteStore {
    async fn find_conversations_by_title_or_message(
        &self,
        owner: &OwnerId,
        query: &str,
    ) -> Result<Vec<ConversationMatch>> {
        let expr = match match_expression(query) {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, created_at, visibility, title_match, message_match
            FROM (
                SELECT c.id, c.owner_id, c.title, c.created_at, c.visibility, c.rowid AS seq,
                       c.id IN (
                           SELECT conversation_id FROM conversations_fts
                           WHERE conversations_fts MATCH ?1
                       ) AS title_match,
                       EXISTS (
                           SELECT 1 FROM messages m
                           WHERE m.conversation_id = c.id
                             AND m.id IN (
                                 SELECT message_id FROM messages_fts
                                 WHERE messages_fts MATCH ?1
                             )
                       ) AS message_match
                FROM conversations c
                WHERE c.owner_id = ?2
            )
            WHERE title_match OR message_match
            ORDER BY created_at DESC, seq ASC
            "#,
        )
        .bind(&expr)
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .context("title/message query failed")?;

        rows.iter()
            .map(|row| {
                let title_match: i64 = row.try_get("title_match")?;
                let message_match: i64 = row.try_get("message_match")?;
                Ok(ConversationMatch {
                    conversation: conversation_from_row(row)?,
                    title_matched: title_match != 0,
                    message_matched: message_match != 0,
                })
            })
            .collect()
    }

    async fn find_documents_by_text(&self, owner: &OwnerId, query: &str) -> Result<Vec<String>> {
        let expr = match match_expression(query) {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };

        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT d.id FROM documents d
            WHERE d.owner_id = ?2
              AND d.id IN (
                  SELECT document_id FROM documents_fts
                  WHERE documents_fts MATCH ?1
              )
            ORDER BY d.created_at DESC
            "#,
        )
        .bind(&expr)
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .context("document query failed")?;

        Ok(ids)
    }

    async fn find_conversations_referencing_documents(
        &self,
        owner: &OwnerId,
        document_ids: &[String],
    ) -> Result<Vec<Conversation>> {
        if document_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids_json = serde_json::to_string(document_ids)?;
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.owner_id, c.title, c.created_at, c.visibility
            FROM conversations c
            WHERE c.owner_id = ?1
              AND EXISTS (
                  SELECT 1 FROM messages m, json_each(?2) AS ref
                  WHERE m.conversation_id = c.id
                    AND instr(m.content, ref.value) > 0
              )
            ORDER BY c.created_at DESC, c.rowid ASC
            "#,
        )
        .bind(owner.as_str())
        .bind(&ids_json)
        .fetch_all(&self.pool)
        .await
        .context("document reference query failed")?;

        rows.iter().map(conversation_from_row).collect()
    }

    async fn list_conversations_by_owner(&self, owner: &OwnerId) -> Result<Vec<Conversation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, created_at, visibility
            FROM conversations
            WHERE owner_id = ?
            ORDER BY created_at DESC, rowid ASC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .context("conversation listing failed")?;

        rows.iter().map(conversation_from_row).collect()
    }
}
