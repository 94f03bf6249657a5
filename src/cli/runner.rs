use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::config::ForumConfig;
use crate::errors::ForumError;
use crate::forum::{ANSWERS, Forum, QUESTIONS};
use crate::import::{ImportOptions, import_file};
use crate::params::QueryParams;
use crate::query::translate;
use crate::store::MemoryStore;
use crate::utils::json::bson_document_to_json;

use super::command::Command;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    /// One JSON value per line.
    Plain,
    /// A single pretty-printed JSON document.
    Json,
}

fn load(store: &MemoryStore, collection: &str, path: &Path) -> Result<(), ForumError> {
    let report = import_file(store, path, &ImportOptions::new(collection))?;
    log::info!("loaded {} documents into '{collection}' from {}", report.inserted, path.display());
    Ok(())
}

fn emit<W: Write>(out: &mut W, mode: OutputMode, items: Vec<serde_json::Value>) -> Result<(), ForumError> {
    match mode {
        OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?,
        OutputMode::Plain => {
            for v in items {
                writeln!(out, "{v}")?;
            }
        }
    }
    Ok(())
}

/// Runs one command, writing results to `out`.
///
/// # Errors
/// Translation, import and store errors are returned to the caller.
pub async fn run<W: Write>(
    cmd: Command,
    cfg: &ForumConfig,
    mode: OutputMode,
    out: &mut W,
) -> Result<(), ForumError> {
    match cmd {
        Command::Translate { params } => {
            let spec = translate(&QueryParams::from_args(&params), &cfg.translate_options())?;
            let json = spec.to_json();
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?,
                OutputMode::Plain => writeln!(out, "{json}")?,
            }
            Ok(())
        }
        Command::List { questions, answers, params } => {
            let store = MemoryStore::new();
            load(&store, QUESTIONS, &questions)?;
            if let Some(a) = &answers {
                load(&store, ANSWERS, a)?;
            }
            let forum = Forum::with_store(Arc::new(store), cfg.clone());
            let page = forum.list_questions(&QueryParams::from_args(&params)).await?;
            emit(out, mode, page.iter().map(bson_document_to_json).collect())
        }
        Command::Answers { answers, question_id } => {
            let store = MemoryStore::new();
            load(&store, ANSWERS, &answers)?;
            let forum = Forum::with_store(Arc::new(store), cfg.clone());
            let list = forum.list_answers(&question_id).await?;
            let items = list.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
            emit(out, mode, items)
        }
    }
}
