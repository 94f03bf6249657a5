//! Count enrichment: decorates a result page with per-document counts from a
//! secondary collection (e.g. each question's number of answers).

use bson::{Bson, Document as BsonDocument};
use std::collections::{HashMap, HashSet};

use crate::errors::ForumError;
use crate::query::{
    Accumulator, FilterSpec, ID_FIELD, Pipeline, Predicate, Stage, group_key,
};
use crate::store::DocumentStore;
use crate::utils::num::bson_to_i64;

/// Name of the `$sum` accumulator inside the group stage.
const GROUP_COUNT: &str = "count";

/// Which secondary collection to count in and where to put the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    pub match_collection: String,
    /// Foreign-key field in `match_collection` holding the primary `_id`.
    pub match_field: String,
    /// Field to group by; `match_field` when unset.
    pub group_field: Option<String>,
    /// Field added to every primary document.
    pub count_field: String,
}

impl CountOptions {
    pub fn new(match_collection: impl Into<String>, match_field: impl Into<String>) -> Self {
        Self {
            match_collection: match_collection.into(),
            match_field: match_field.into(),
            group_field: None,
            count_field: GROUP_COUNT.to_string(),
        }
    }

    #[must_use]
    pub fn with_group_field(mut self, field: impl Into<String>) -> Self {
        self.group_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn with_count_field(mut self, field: impl Into<String>) -> Self {
        self.count_field = field.into();
        self
    }

    #[must_use]
    pub fn group_field(&self) -> &str {
        self.group_field.as_deref().unwrap_or(&self.match_field)
    }

    /// `[{$match: {<match_field>: {$in: ids}}}, {$group: {_id: "$<group_field>", count: {$sum: 1}}}]`
    #[must_use]
    pub fn pipeline(&self, ids: Vec<Bson>) -> Pipeline {
        Pipeline::new(vec![
            Stage::Match(FilterSpec::new().with(self.match_field.as_str(), Predicate::is_in(ids))),
            Stage::Group {
                key: self.group_field().to_string(),
                accumulators: vec![(GROUP_COUNT.to_string(), Accumulator::count())],
            },
        ])
    }
}

/// Adds `opts.count_field` to every document: the number of documents in
/// `opts.match_collection` whose foreign key equals the document's `_id`.
///
/// Only the ids on this page are looked up, with one aggregation. Input order is
/// preserved; documents with no matches (or no `_id`) get `0`.
///
/// # Errors
/// Store failures are returned unchanged; no partial result is produced.
pub async fn add_count_to_documents(
    store: &dyn DocumentStore,
    docs: Vec<BsonDocument>,
    opts: &CountOptions,
) -> Result<Vec<BsonDocument>, ForumError> {
    let mut seen = HashSet::new();
    let ids: Vec<Bson> = docs
        .iter()
        .filter_map(|d| d.get(ID_FIELD))
        .filter(|id| seen.insert(group_key(id)))
        .cloned()
        .collect();

    let counts: HashMap<String, i64> = if ids.is_empty() {
        HashMap::new()
    } else {
        let n_ids = ids.len();
        let groups = store.aggregate(&opts.match_collection, &opts.pipeline(ids)).await?;
        log::debug!(
            "counted {} in '{}' for {n_ids} ids: {} groups",
            opts.match_field,
            opts.match_collection,
            groups.len()
        );
        groups
            .iter()
            .filter_map(|g| {
                let n = g.get(GROUP_COUNT).and_then(bson_to_i64)?;
                Some((group_key(g.get(ID_FIELD)?), n))
            })
            .collect()
    };

    Ok(docs
        .into_iter()
        .map(|mut d| {
            let n = d.get(ID_FIELD).and_then(|id| counts.get(&group_key(id))).copied().unwrap_or(0);
            d.insert(opts.count_field.clone(), Bson::Int64(n));
            d
        })
        .collect())
}
