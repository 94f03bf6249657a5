use bson::doc;
use forum_query::store::MemoryStore;
use forum_query::{CountOptions, add_count_to_documents};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        cases: 64,
        failure_persistence: Some(Box::new(proptest::test_runner::FileFailurePersistence::WithSource("proptest-regressions"))),
        .. proptest::test_runner::Config::default()
    })]

    // Counts equal a brute-force tally and the page order is untouched.
    #[test]
    fn prop_counts_match_tally(page in proptest::collection::vec(0u8..8, 0..10), answers in proptest::collection::vec(0u8..10, 0..40)) {
        let store = MemoryStore::new();
        store.insert_many("answers", answers.iter().map(|a| doc! { "questionId": format!("q{a}") }));
        let docs: Vec<_> = page.iter().map(|p| doc! { "_id": format!("q{p}") }).collect();
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let out = rt
            .block_on(add_count_to_documents(&store, docs, &CountOptions::new("answers", "questionId")))
            .unwrap();
        prop_assert_eq!(out.len(), page.len());
        for (d, p) in out.iter().zip(&page) {
            prop_assert_eq!(d.get_str("_id").unwrap(), format!("q{p}"));
            let want = answers.iter().filter(|a| *a == p).count() as i64;
            prop_assert_eq!(d.get_i64("count").unwrap(), want);
        }
    }
}
