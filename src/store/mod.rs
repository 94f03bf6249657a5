//! Document storage seam. Listing and enrichment only talk to [`DocumentStore`];
//! [`MemoryStore`] is the in-process implementation and [`StorePool`] bounds how
//! many requests hold a store handle at once.

mod memory;
mod pool;

pub use memory::MemoryStore;
pub use pool::{PooledStore, StorePool};

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};

use crate::errors::ForumError;
use crate::query::{FilterSpec, Pipeline, QuerySpec};

/// Read/write access to named document collections.
///
/// Implementations must treat an unknown collection as empty.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Matching documents ordered by `query.sort`, then sliced by `skip`/`limit`.
    async fn find(&self, collection: &str, query: &QuerySpec) -> Result<Vec<BsonDocument>, ForumError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &FilterSpec,
    ) -> Result<Option<BsonDocument>, ForumError>;

    async fn count(&self, collection: &str, filter: &FilterSpec) -> Result<u64, ForumError>;

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<BsonDocument>, ForumError>;

    /// Inserts `doc`, assigning a fresh `_id` when it has none. Returns the id.
    async fn insert_one(&self, collection: &str, doc: BsonDocument) -> Result<Bson, ForumError>;

    /// Overwrites the top-level fields in `set` on the first document matching
    /// `filter` (`$set` semantics). Returns the number of documents modified.
    async fn update_one(
        &self,
        collection: &str,
        filter: &FilterSpec,
        set: BsonDocument,
    ) -> Result<u64, ForumError>;

    /// Removes the first document matching `filter`. Returns the number removed.
    async fn delete_one(&self, collection: &str, filter: &FilterSpec) -> Result<u64, ForumError>;
}
