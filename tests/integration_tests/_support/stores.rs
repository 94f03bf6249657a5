//! Store doubles for exercising the enricher and request handlers.
use async_trait::async_trait;
use bson::{Bson, Document};
use forum_query::ForumError;
use forum_query::query::{FilterSpec, Pipeline, QuerySpec};
use forum_query::store::{DocumentStore, MemoryStore};
use parking_lot::Mutex;

/// Returns canned aggregation results and records every pipeline it is given.
pub struct ScriptedStore {
    pub groups: Vec<Document>,
    pub seen: Mutex<Vec<Vec<Document>>>,
}

impl ScriptedStore {
    pub fn new(groups: Vec<Document>) -> Self {
        Self { groups, seen: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn find(&self, _: &str, _: &QuerySpec) -> Result<Vec<Document>, ForumError> {
        Ok(Vec::new())
    }
    async fn find_one(&self, _: &str, _: &FilterSpec) -> Result<Option<Document>, ForumError> {
        Ok(None)
    }
    async fn count(&self, _: &str, _: &FilterSpec) -> Result<u64, ForumError> {
        Ok(0)
    }
    async fn aggregate(&self, _: &str, pipeline: &Pipeline) -> Result<Vec<Document>, ForumError> {
        self.seen.lock().push(pipeline.to_documents());
        Ok(self.groups.clone())
    }
    async fn insert_one(&self, _: &str, _: Document) -> Result<Bson, ForumError> {
        Ok(Bson::Null)
    }
    async fn update_one(&self, _: &str, _: &FilterSpec, _: Document) -> Result<u64, ForumError> {
        Ok(0)
    }
    async fn delete_one(&self, _: &str, _: &FilterSpec) -> Result<u64, ForumError> {
        Ok(0)
    }
}

/// Serves reads from an inner [`MemoryStore`] but fails every aggregation.
pub struct FailingAggregate {
    pub inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for FailingAggregate {
    async fn find(&self, c: &str, q: &QuerySpec) -> Result<Vec<Document>, ForumError> {
        self.inner.find(c, q).await
    }
    async fn find_one(&self, c: &str, f: &FilterSpec) -> Result<Option<Document>, ForumError> {
        self.inner.find_one(c, f).await
    }
    async fn count(&self, c: &str, f: &FilterSpec) -> Result<u64, ForumError> {
        self.inner.count(c, f).await
    }
    async fn aggregate(&self, _: &str, _: &Pipeline) -> Result<Vec<Document>, ForumError> {
        Err(ForumError::Database("aggregation failed: connection reset".into()))
    }
    async fn insert_one(&self, c: &str, d: Document) -> Result<Bson, ForumError> {
        self.inner.insert_one(c, d).await
    }
    async fn update_one(&self, c: &str, f: &FilterSpec, set: Document) -> Result<u64, ForumError> {
        self.inner.update_one(c, f, set).await
    }
    async fn delete_one(&self, c: &str, f: &FilterSpec) -> Result<u64, ForumError> {
        self.inner.delete_one(c, f).await
    }
}
