//! Listing queries for a discussion forum.
//!
//! A flat query-string mapping (`filter_title=rust&sort_createdAt=-1&limit_x=10`) is
//! translated into a [`query::QuerySpec`], executed against an injected
//! [`store::DocumentStore`], and the resulting page is decorated with per-document
//! counts from a secondary collection by [`enrich::add_count_to_documents`].

pub mod cli;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod forum;
pub mod import;
pub mod logger;
pub mod params;
pub mod query;
pub mod store;
pub mod types;
pub mod utils;

pub use config::ForumConfig;
pub use enrich::{CountOptions, add_count_to_documents};
pub use errors::ForumError;
pub use forum::Forum;
pub use params::{QueryParams, QueryValue};
pub use query::{QuerySpec, TranslateOptions, translate};
pub use store::{DocumentStore, MemoryStore, StorePool};
