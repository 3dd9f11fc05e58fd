//! # chat-search CLI
//!
//! ```bash
//! chat-search --config ./config/chat-search.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `chat-search init` | Create the SQLite database and run schema migrations |
//! | `chat-search import <file>` | Load conversations, messages and documents from JSON |
//! | `chat-search search <owner> [query]` | Search an owner's conversations |
//! | `chat-search serve` | Start the HTTP server |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chat_search::sqlite_store::SqliteStore;
use chat_search::{config, db, import, logging, migrate, search, server};

/// Hybrid full-text search over chat conversations, messages and
/// referenced documents.
#[derive(Parser)]
#[command(name = "chat-search", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/chat-search.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Import conversations, messages and documents from a JSON file.
    Import {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Search an owner's conversations.
    ///
    /// An empty query lists every conversation of the owner.
    Search {
        /// Owner (user) identifier.
        owner: String,

        /// The search query.
        #[arg(default_value = "")]
        query: String,

        /// Print results as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging.filter);

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Import { file } => {
            let pool = db::connect(&cfg).await?;
            let store = SqliteStore::new(pool.clone());
            import::run_import(&store, &file).await?;
            pool.close().await;
        }
        Commands::Search { owner, query, json } => {
            let resolver = search::open_resolver(&cfg).await?;
            search::run_search(&resolver, &owner, &query, json).await?;
            resolver.store().pool().close().await;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
