#![no_main]
use forum_query::{QueryParams, TranslateOptions, translate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|pairs: Vec<(String, String)>| {
    if pairs.len() > 64 { return; }
    // Translation either succeeds or rejects a value; it must never panic.
    let params = QueryParams::from_pairs(pairs);
    if let Ok(spec) = translate(&params, &TranslateOptions::default()) {
        assert!(spec.limit >= 1 && spec.limit <= forum_query::query::MAX_LIMIT);
        let _ = spec.to_json();
    }
});
