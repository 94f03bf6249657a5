// Aggregates per-module integration suites
#[path = "_support/stores.rs"]
pub mod support;

#[path = "cli/mod_cli.rs"]
mod cli;
#[path = "config/mod_config.rs"]
mod config;
#[path = "enrich/mod_enrich.rs"]
mod enrich;
#[path = "forum/mod_forum.rs"]
mod forum;
#[path = "query/mod_translate.rs"]
mod translate;
