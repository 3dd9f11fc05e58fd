//! Application-level search entry points.
//!
//! The resolution algorithm lives in `chat-search-core::resolver` and runs
//! through the [`ChatStore`](chat_search_core::ChatStore) trait. This
//! module wires it to the SQLite store and formats CLI output.

use anyhow::Result;

pub use chat_search_core::{ConversationHit, HybridSearchResolver, MatchType, OwnerId};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// The resolver type used by the CLI and server.
pub type Resolver = HybridSearchResolver<SqliteStore>;

/// Open the configured database once and build a resolver over it.
pub async fn open_resolver(config: &Config) -> Result<Resolver> {
    let pool = db::connect(config).await?;
    Ok(HybridSearchResolver::with_options(
        SqliteStore::new(pool),
        config.search.resolver_options(),
    ))
}

/// CLI entry point for `chat-search search`.
pub async fn run_search(resolver: &Resolver, owner: &str, query: &str, json: bool) -> Result<()> {
    let owner = OwnerId::new(owner)?;
    let hits = resolver.search(&owner, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let tag = hit.match_type.map(|t| t.as_str()).unwrap_or("-");
        println!("{}. [{}] {}", i + 1, tag, hit.conversation.title);
        println!(
            "    created: {}",
            hit.conversation.created_at.format("%Y-%m-%dT%H:%M:%SZ")
        );
        println!("    visibility: {}", hit.conversation.visibility.as_str());
        println!("    id: {}", hit.conversation.id);
        println!();
    }

    Ok(())
}
