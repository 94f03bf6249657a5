use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;

/// Convert a serde_json::Value that must be an object into a bson::Document.
/// Returns io::Error with InvalidData on malformed input.
pub fn json_value_to_bson_document(val: &serde_json::Value) -> io::Result<bson::Document> {
    let obj = val
        .as_object()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "expected JSON object"))?;
    bson::Document::try_from(obj.clone())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Parse a JSON string into a bson::Document. The JSON must be a top-level object.
pub fn parse_json_to_bson_document(json: &str) -> io::Result<bson::Document> {
    let val: serde_json::Value =
        serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json_value_to_bson_document(&val)
}

/// Relaxed extended JSON: numbers stay numbers, dates become `{"$date": ...}`.
#[must_use]
pub fn bson_document_to_json(doc: &bson::Document) -> serde_json::Value {
    bson::Bson::Document(doc.clone()).into_relaxed_extjson()
}

/// Serializes a model into a document, going through its JSON form.
pub fn to_bson_document<T: Serialize>(value: &T) -> io::Result<bson::Document> {
    let val = serde_json::to_value(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    json_value_to_bson_document(&val)
}

pub fn from_bson_document<T: DeserializeOwned>(doc: &bson::Document) -> io::Result<T> {
    serde_json::from_value(bson_document_to_json(doc))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
