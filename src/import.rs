//! NDJSON (one JSON object per line) seeding for [`MemoryStore`].

use bson::Document as BsonDocument;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::store::MemoryStore;
use crate::utils::json::json_value_to_bson_document;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub collection: String,
    /// Skip malformed lines instead of failing the whole import.
    pub skip_errors: bool,
    pub progress_every: Option<usize>,
}

impl ImportOptions {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), skip_errors: false, progress_every: Some(1000) }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: u64,
    pub skipped: u64,
    /// `(line number, error)` for every skipped line.
    pub errors: Vec<(usize, String)>,
}

/// Reads NDJSON from `reader` into `opts.collection`. Blank lines are ignored.
///
/// # Errors
/// I/O errors, or the first malformed line when `skip_errors` is off.
pub fn import_ndjson<R: Read>(store: &MemoryStore, reader: R, opts: &ImportOptions) -> io::Result<ImportReport> {
    let mut report = ImportReport::default();
    let mut reader = BufReader::new(reader);
    let mut line_no: usize = 0;
    let mut buf = String::with_capacity(8 * 1024);
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            break;
        }
        line_no += 1;
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(doc) => {
                store.insert_many(&opts.collection, [doc]);
                report.inserted += 1;
                if let Some(every) = opts.progress_every
                    && every > 0
                    && line_no % every == 0
                {
                    log::info!("imported {} records into '{}'", report.inserted, opts.collection);
                }
            }
            Err(e) => {
                if !opts.skip_errors {
                    return Err(io::Error::new(io::ErrorKind::InvalidData, format!("line {line_no}: {e}")));
                }
                log::warn!("skipping line {line_no} of '{}' import: {e}", opts.collection);
                report.skipped += 1;
                report.errors.push((line_no, e.to_string()));
            }
        }
    }
    log::debug!("ndjson import into '{}': {report:?}", opts.collection);
    Ok(report)
}

/// # Errors
/// See [`import_ndjson`]; also fails if `path` cannot be opened.
pub fn import_file(store: &MemoryStore, path: &Path, opts: &ImportOptions) -> io::Result<ImportReport> {
    import_ndjson(store, File::open(path)?, opts)
}

fn parse_line(line: &str) -> io::Result<BsonDocument> {
    let v: serde_json::Value =
        serde_json::from_str(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json_value_to_bson_document(&v)
}
