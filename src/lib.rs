//! # chat-search
//!
//! **Hybrid full-text search over chat conversations.**
//!
//! Finds a user's conversations that match a query by title, by message
//! content, or because one of their messages references a matching stored
//! document. Each result is tagged with how it matched and the list is
//! ordered newest first.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   CLI    │   │   HTTP   │
//! │ (search) │   │ (/api)   │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!             ▼
//!   ┌───────────────────┐      ┌──────────────────┐
//!   │ HybridSearch-     │─────▶│ ChatStore        │
//!   │ Resolver (core)   │      │ SQLite FTS5 /    │
//!   └───────────────────┘      │ in-memory        │
//!                              └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Schema and FTS5 projections (idempotent) |
//! | [`fts`] | Safe FTS5 `MATCH` expressions from user input |
//! | [`sqlite_store`] | [`ChatStore`](chat_search_core::ChatStore) over SQLite |
//! | [`import`] | JSON fixture import |
//! | [`search`] | Resolver wiring and CLI output |
//! | [`server`] | Axum HTTP server |
//! | [`logging`] | `tracing` subscriber setup |

pub mod config;
pub mod db;
pub mod fts;
pub mod import;
pub mod logging;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
