use bson::{Bson, doc};
use forum_query::store::MemoryStore;
use forum_query::{CountOptions, ForumError, add_count_to_documents};

use super::support::{FailingAggregate, ScriptedStore};

fn answers_count() -> CountOptions {
    CountOptions::new("answers", "questionId").with_count_field("answersCount")
}

fn ids_and_counts(docs: &[bson::Document]) -> Vec<(String, i64)> {
    docs.iter()
        .map(|d| (d.get_str("_id").unwrap().to_string(), d.get_i64("answersCount").unwrap()))
        .collect()
}

#[tokio::test]
async fn order_is_kept_whatever_order_groups_come_back_in() {
    let store = ScriptedStore::new(vec![
        doc! {"_id": "c", "count": 3},
        doc! {"_id": "a", "count": 1_i64},
        doc! {"_id": "b", "count": 2},
    ]);
    let docs = vec![doc! {"_id": "a"}, doc! {"_id": "b"}, doc! {"_id": "c"}];
    let out = add_count_to_documents(&store, docs, &answers_count()).await.unwrap();
    assert_eq!(ids_and_counts(&out), vec![("a".into(), 1), ("b".into(), 2), ("c".into(), 3)]);
}

#[tokio::test]
async fn unmatched_documents_get_zero_not_absent() {
    let store = MemoryStore::new();
    store.insert_many("answers", vec![doc! {"questionId": "a"}]);
    let docs = vec![doc! {"_id": "a", "title": "t"}, doc! {"_id": "z"}];
    let out = add_count_to_documents(&store, docs, &answers_count()).await.unwrap();
    assert_eq!(out[1].get("answersCount"), Some(&Bson::Int64(0)));
    assert_eq!(out[0].get_str("title").unwrap(), "t");
}

#[tokio::test]
async fn lookup_is_scoped_to_the_page_ids() {
    let store = ScriptedStore::new(Vec::new());
    let docs = vec![doc! {"_id": "a"}, doc! {"_id": "b"}, doc! {"_id": "a"}];
    add_count_to_documents(&store, docs, &answers_count()).await.unwrap();
    let seen = store.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        vec![
            doc! { "$match": { "questionId": { "$in": ["a", "b"] } } },
            doc! { "$group": { "_id": "$questionId", "count": { "$sum": 1 } } },
        ]
    );
}

#[tokio::test]
async fn empty_page_issues_no_aggregation() {
    let store = ScriptedStore::new(Vec::new());
    let out = add_count_to_documents(&store, Vec::new(), &answers_count()).await.unwrap();
    assert!(out.is_empty());
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn aggregation_failure_propagates_unchanged() {
    let store = FailingAggregate { inner: MemoryStore::new() };
    let err = add_count_to_documents(&store, vec![doc! {"_id": "a"}], &answers_count())
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::Database(ref m) if m.contains("connection reset")));
}

#[tokio::test]
async fn separate_group_field() {
    let store = MemoryStore::new();
    store.insert_many(
        "votes",
        vec![doc! {"target": "a", "t": "a"}, doc! {"target": "a", "t": "a"}, doc! {"target": "b", "t": "b"}],
    );
    let opts = CountOptions::new("votes", "target").with_group_field("t").with_count_field("votes");
    let out = add_count_to_documents(&store, vec![doc! {"_id": "b"}, doc! {"_id": "a"}], &opts)
        .await
        .unwrap();
    assert_eq!(out[0].get_i64("votes").unwrap(), 1);
    assert_eq!(out[1].get_i64("votes").unwrap(), 2);
}
