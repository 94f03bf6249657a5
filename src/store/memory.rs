use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ForumError;
use crate::logger::QUERY_TARGET;
use crate::query::{FilterMatcher, FilterSpec, ID_FIELD, Pipeline, QuerySpec, compare_docs, run_pipeline};
use crate::types::{CollectionName, DocumentId};

use super::DocumentStore;

/// Insertion-ordered documents of one collection.
#[derive(Debug, Default)]
struct Collection {
    docs: RwLock<Vec<BsonDocument>>,
}

impl Collection {
    fn insert(&self, mut doc: BsonDocument) -> Bson {
        let id = match doc.get(ID_FIELD) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::from(DocumentId::new());
                doc.insert(ID_FIELD, id.clone());
                id
            }
        };
        self.docs.write().push(doc);
        id
    }

    fn snapshot(&self) -> Vec<BsonDocument> {
        self.docs.read().clone()
    }
}

/// In-process [`DocumentStore`] with the matching, ordering and grouping
/// semantics of a document database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    fn collection_or_create(&self, name: &str) -> Arc<Collection> {
        if let Some(c) = self.collection(name) {
            return c;
        }
        self.collections.write().entry(name.to_string()).or_default().clone()
    }

    /// Synchronous bulk load, used by seeding and the NDJSON importer.
    pub fn insert_many(&self, collection: &str, docs: impl IntoIterator<Item = BsonDocument>) -> usize {
        let col = self.collection_or_create(collection);
        docs.into_iter().map(|d| col.insert(d)).count()
    }

    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collection(collection).map_or(0, |c| c.docs.read().len())
    }

    fn matching(&self, collection: &str, filter: &FilterSpec) -> Result<Vec<BsonDocument>, ForumError> {
        let Some(col) = self.collection(collection) else {
            return Ok(Vec::new());
        };
        let m = FilterMatcher::new(filter)?;
        Ok(col.docs.read().iter().filter(|d| m.matches(d)).cloned().collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, query: &QuerySpec) -> Result<Vec<BsonDocument>, ForumError> {
        let started = std::time::Instant::now();
        let mut docs = self.matching(collection, &query.filter)?;
        let matched = docs.len();
        if !query.sort.is_empty() {
            // stable: equal keys keep insertion order
            docs.sort_by(|a, b| compare_docs(a, b, &query.sort));
        }
        let page: Vec<BsonDocument> = docs.into_iter().skip(query.skip).take(query.limit).collect();
        log::debug!(
            target: QUERY_TARGET,
            "{{\"op\":\"find\",\"collection\":\"{}\",\"matched\":{},\"returned\":{},\"skip\":{},\"limit\":{},\"duration_us\":{}}}",
            collection,
            matched,
            page.len(),
            query.skip,
            query.limit,
            started.elapsed().as_micros()
        );
        Ok(page)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &FilterSpec,
    ) -> Result<Option<BsonDocument>, ForumError> {
        let Some(col) = self.collection(collection) else {
            return Ok(None);
        };
        let m = FilterMatcher::new(filter)?;
        Ok(col.docs.read().iter().find(|d| m.matches(d)).cloned())
    }

    async fn count(&self, collection: &str, filter: &FilterSpec) -> Result<u64, ForumError> {
        let n = self.matching(collection, filter)?.len();
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }

    async fn aggregate(
        &self,
        collection: &str,
        pipeline: &Pipeline,
    ) -> Result<Vec<BsonDocument>, ForumError> {
        let docs = self.collection(collection).map(|c| c.snapshot()).unwrap_or_default();
        let out = run_pipeline(docs, pipeline)?;
        log::debug!(
            target: QUERY_TARGET,
            "{{\"op\":\"aggregate\",\"collection\":\"{}\",\"stages\":{},\"groups\":{}}}",
            collection,
            pipeline.stages.len(),
            out.len()
        );
        Ok(out)
    }

    async fn insert_one(&self, collection: &str, doc: BsonDocument) -> Result<Bson, ForumError> {
        Ok(self.collection_or_create(collection).insert(doc))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &FilterSpec,
        set: BsonDocument,
    ) -> Result<u64, ForumError> {
        if set.contains_key(ID_FIELD) {
            return Err(ForumError::Validation(format!("{ID_FIELD} is immutable")));
        }
        let Some(col) = self.collection(collection) else {
            return Ok(0);
        };
        let m = FilterMatcher::new(filter)?;
        let mut docs = col.docs.write();
        let Some(doc) = docs.iter_mut().find(|d| m.matches(d)) else {
            return Ok(0);
        };
        for (k, v) in set {
            doc.insert(k, v);
        }
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: &FilterSpec) -> Result<u64, ForumError> {
        let Some(col) = self.collection(collection) else {
            return Ok(0);
        };
        let m = FilterMatcher::new(filter)?;
        let mut docs = col.docs.write();
        match docs.iter().position(|d| m.matches(d)) {
            Some(i) => {
                docs.remove(i);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
