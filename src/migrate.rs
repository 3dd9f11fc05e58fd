//! Database schema migrations (idempotent).
//!
//! Base tables hold the rows written by the chat subsystems; the `*_fts`
//! FTS5 tables are the searchable projections (conversation title, message
//! content, document title + content). All FTS tables use the
//! `porter unicode61` tokenizer so matching is case-insensitive and stemmed.

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            visibility TEXT NOT NULL DEFAULT 'private'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            conversation_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // FTS5 CREATE is not idempotent natively, so we check first
    let fts_tables = [
        (
            "conversations_fts",
            "CREATE VIRTUAL TABLE conversations_fts USING fts5(
                conversation_id UNINDEXED,
                title,
                tokenize='porter unicode61'
            )",
        ),
        (
            "messages_fts",
            "CREATE VIRTUAL TABLE messages_fts USING fts5(
                message_id UNINDEXED,
                conversation_id UNINDEXED,
                content,
                tokenize='porter unicode61'
            )",
        ),
        (
            "documents_fts",
            "CREATE VIRTUAL TABLE documents_fts USING fts5(
                document_id UNINDEXED,
                title,
                content,
                tokenize='porter unicode61'
            )",
        ),
    ];

    for (name, ddl) in fts_tables {
        let exists: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name = ?",
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        if !exists {
            sqlx::query(ddl).execute(pool).await?;
            tracing::debug!(table = name, "created FTS table");
        }
    }

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversations_owner_created ON conversations(owner_id, created_at DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_owner_id ON documents(owner_id)")
        .execute(pool)
        .await?;

    Ok(())
}
