//! # chat-search core
//!
//! Storage-agnostic logic for hybrid chat search: conversation, message and
//! document models, the [`store::ChatStore`] query contract, text matching,
//! and the [`resolver::HybridSearchResolver`] that unions title, message and
//! document matches into one recency-ordered list.
//!
//! This crate has no tokio, sqlx, or filesystem dependencies. Concrete
//! backends (SQLite, in-memory) implement [`store::ChatStore`].

pub mod error;
pub mod models;
pub mod resolver;
pub mod store;
pub mod text;

pub use error::SearchError;
pub use models::{
    Conversation, ConversationHit, ConversationMatch, Document, MatchType, Message,
    MessageContent, OwnerId, Role, Visibility,
};
pub use resolver::{HybridSearchResolver, ResolverOptions};
pub use store::ChatStore;
