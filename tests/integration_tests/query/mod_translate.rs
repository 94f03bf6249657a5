use bson::{Bson, doc};
use forum_query::query::{Order, Predicate, SortSpec};
use forum_query::{ForumConfig, ForumError, QueryParams, QuerySpec, TranslateOptions, translate};

fn tr(pairs: &[(&str, &str)]) -> Result<QuerySpec, ForumError> {
    translate(&QueryParams::from_pairs(pairs.iter().copied()), &TranslateOptions::default())
}

#[test]
fn range_keys_accumulate_on_one_field() {
    let q = tr(&[("filter_score_gte", "5"), ("filter_title", "rust"), ("filter_score_lte", "10")]).unwrap();
    assert_eq!(
        q.filter_document(),
        doc! {
            "score": { "$gte": 5, "$lte": 10 },
            "title": { "$regex": "rust", "$options": "i" },
        }
    );
}

#[test]
fn user_sort_precedes_forced_id_tiebreaker() {
    let q = tr(&[("sort_createdAt", "-1")]).unwrap();
    let keys: Vec<&str> = q.sort.iter().map(|s| s.field.as_str()).collect();
    assert_eq!(keys, vec!["createdAt", "_id"]);
    assert_eq!(q.sort[1], SortSpec::new("_id", Order::Asc));
}

#[test]
fn defaults_without_paging() {
    let q = tr(&[("filter_isAnswered", "false")]).unwrap();
    assert_eq!((q.skip, q.limit), (0, 20));
}

#[test]
fn is_answered_true_is_boolean_equality() {
    let q = tr(&[("filter_isAnswered", "true")]).unwrap();
    assert_eq!(q.filter.get("isAnswered"), Some(&Predicate::Equals(Bson::Boolean(true))));
}

#[test]
fn tags_in_splits_on_underscore() {
    let q = tr(&[("filter_tags_in", "react_hooks")]).unwrap();
    assert_eq!(q.filter_document(), doc! { "tags": { "$in": ["react", "hooks"] } });
}

#[test]
fn suffixed_paging_keys() {
    let q = tr(&[("skip_questions", "40"), ("limit_questions", "10")]).unwrap();
    assert_eq!((q.skip, q.limit), (40, 10));
}

#[test]
fn regex_metacharacters_are_literal() {
    let q = tr(&[("filter_title", "c++")]).unwrap();
    assert_eq!(q.filter_document(), doc! { "title": { "$regex": r"c\+\+", "$options": "i" } });
}

#[test]
fn json_rendering_of_full_spec() {
    let q = tr(&[("filter_score_gt", "2.5"), ("sort_score", "-1"), ("limit", "5")]).unwrap();
    assert_eq!(
        q.to_json(),
        serde_json::json!({
            "filter": { "score": { "$gt": 2.5 } },
            "sort": { "score": -1, "_id": 1 },
            "skip": 0,
            "limit": 5,
        })
    );
}

#[test]
fn config_limits_flow_into_translation() {
    let cfg = ForumConfig::from_toml_str("default_limit = 5\nmax_limit = 50").unwrap();
    let opts = cfg.translate_options();
    let q = translate(&QueryParams::new(), &opts).unwrap();
    assert_eq!(q.limit, 5);
    let q = translate(&QueryParams::from_pairs([("limit", "1000")]), &opts).unwrap();
    assert_eq!(q.limit, 50);
}

#[test]
fn rejected_values_map_to_client_errors() {
    let err = tr(&[("filter_score_gte", "abc")]).unwrap_err();
    assert_eq!(err.status(), 400);
    let body = err.to_response_body();
    assert!(body["error"].as_str().unwrap().contains("filter_score_gte"));
}

#[test]
fn command_line_style_params() {
    let p = QueryParams::from_args(["filter_tags_all=rust_async", "sort_score=1", "limit=3"]);
    let q = translate(&p, &TranslateOptions::default()).unwrap();
    assert_eq!(q.filter_document(), doc! { "tags": { "$all": ["rust", "async"] } });
    assert_eq!(q.limit, 3);
}
