#[path = "enrich/prop_enrich.rs"]
mod prop_enrich;
#[path = "query/prop_eval.rs"]
mod prop_eval;
#[path = "query/prop_translate.rs"]
mod prop_translate;
