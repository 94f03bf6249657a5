use bson::{Bson, doc};
use forum_query::query::{eval_filter, parse_bool};
use forum_query::{QueryParams, TranslateOptions, translate};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    // A substring filter matches its own text embedded in any casing.
    #[test]
    fn prop_substring_matches_literally(needle in "[ -~]{0,12}", pre in "[a-z ]{0,6}", post in "[a-z ]{0,6}") {
        prop_assume!(parse_bool(&needle).is_none());
        let q = translate(&QueryParams::from_pairs([("filter_title", needle.as_str())]), &TranslateOptions::default()).unwrap();
        let title = format!("{pre}{}{post}", needle.to_ascii_uppercase());
        let d = doc! { "title": title };
        prop_assert!(eval_filter(&d, &q.filter).unwrap());
    }

    #[test]
    fn prop_gt_and_lte_are_complementary(x in -1_000_000i64..1_000_000, bound in -1_000_000i64..1_000_000) {
        let d = doc! { "score": x };
        let gt = translate(&QueryParams::from_pairs([("filter_score_gt", bound.to_string())]), &TranslateOptions::default()).unwrap();
        let lte = translate(&QueryParams::from_pairs([("filter_score_lte", bound.to_string())]), &TranslateOptions::default()).unwrap();
        prop_assert_eq!(eval_filter(&d, &gt.filter).unwrap(), !eval_filter(&d, &lte.filter).unwrap());
    }

    #[test]
    fn prop_in_matches_any_listed_tag(tags in proptest::collection::vec("[a-z]{1,6}", 1..5), pick in any::<prop::sample::Index>()) {
        let wanted = tags[pick.index(tags.len())].clone();
        let q = translate(&QueryParams::from_pairs([("filter_tags_in", tags.join("_"))]), &TranslateOptions::default()).unwrap();
        let d = doc! { "tags": [Bson::String(wanted), Bson::String("zzzzzzz".into())] };
        prop_assert!(eval_filter(&d, &q.filter).unwrap());
    }
}
