#![no_main]
use arbitrary::Arbitrary;
use forum_query::query::eval_filter;
use forum_query::{QueryParams, TranslateOptions, translate};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    params: Vec<(String, String)>,
    document: String,
}

fuzz_target!(|input: Input| {
    if input.params.len() > 32 || input.document.len() > 8192 { return; }
    let Ok(doc) = forum_query::utils::json::parse_json_to_bson_document(&input.document) else { return };
    if let Ok(spec) = translate(&QueryParams::from_pairs(input.params), &TranslateOptions::default()) {
        let _ = eval_filter(&doc, &spec.filter);
    }
});
