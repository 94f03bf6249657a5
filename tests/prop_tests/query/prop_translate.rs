use bson::doc;
use forum_query::query::{MAX_LIMIT, ParsedKey};
use forum_query::{ForumError, QueryParams, TranslateOptions, translate};
use proptest::prelude::*;

fn field() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,10}"
}

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_range_bounds_accumulate(f in field(), lo in any::<i32>(), hi in any::<i32>()) {
        let p = QueryParams::from_pairs([
            (format!("filter_{f}_gte"), lo.to_string()),
            (format!("filter_{f}_lte"), hi.to_string()),
        ]);
        let q = translate(&p, &TranslateOptions::default()).unwrap();
        let mut want = bson::Document::new();
        want.insert(f.clone(), doc! { "$gte": lo, "$lte": hi });
        prop_assert_eq!(q.filter_document(), want);
    }

    #[test]
    fn prop_id_tiebreaker_is_always_last(fields in proptest::collection::btree_set(field(), 1..6)) {
        let pairs: Vec<(String, String)> = fields.iter().map(|f| (format!("sort_{f}"), "-1".to_string())).collect();
        let q = translate(&QueryParams::from_pairs(pairs), &TranslateOptions::default()).unwrap();
        let got: Vec<&str> = q.sort.iter().map(|s| s.field.as_str()).collect();
        let mut want: Vec<&str> = fields.iter().map(String::as_str).collect();
        want.push("_id");
        prop_assert_eq!(got, want);
    }

    #[test]
    fn prop_limit_is_clamped(limit in 1u64..1_000_000, skip in 0u64..1_000_000) {
        let p = QueryParams::from_pairs([("limit", limit.to_string()), ("skip", skip.to_string())]);
        let q = translate(&p, &TranslateOptions::default()).unwrap();
        prop_assert_eq!(q.limit as u64, limit.min(MAX_LIMIT as u64));
        prop_assert_eq!(q.skip as u64, skip);
    }

    // Arbitrary input either translates or is rejected with a named key.
    #[test]
    fn prop_never_panics(pairs in proptest::collection::vec(("[a-z_]{0,16}", ".{0,12}"), 0..8)) {
        match translate(&QueryParams::from_pairs(pairs), &TranslateOptions::default()) {
            Ok(q) => prop_assert!(q.limit >= 1 && q.limit <= MAX_LIMIT),
            Err(ForumError::InvalidQueryValue { key, .. }) => prop_assert!(ParsedKey::parse(&key).is_some()),
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }
}
