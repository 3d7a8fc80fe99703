use std::path::Path;

use serde_json::Value;

use crate::common::{kind_of, looks_like_html, parse_json, preview, Fetch};
use crate::config::Endpoints;
use crate::error::{Error, Result};

/// Parse a candidate vote file. It must be a JSON array; HTML error pages
/// and other shapes are rejected rather than read as zero candidates.
pub fn parse_candidate_payload(source_name: &str, bytes: &[u8], content_type: Option<&str>) -> Result<Vec<Value>> {
    if looks_like_html(bytes, content_type) {
        return Err(Error::Parse {
            source_name: source_name.to_string(),
            reason: "expected JSON, got an HTML page".into(),
            preview: preview(bytes),
        });
    }
    match parse_json::<Value>(source_name, bytes)? {
        Value::Array(records) => Ok(records),
        other => Err(Error::UnexpectedShape { source_name: source_name.to_string(), found: kind_of(&other) }),
    }
}

/// Load raw candidate records from the configured source: fetched when it
/// is an http(s) URL, read from disk otherwise.
pub fn load_candidates(fetcher: &dyn Fetch, endpoints: &Endpoints) -> Result<Vec<Value>> {
    let source = endpoints.candidates.as_str();
    let records = if endpoints.candidates_is_remote() {
        let fetched = fetcher.fetch(source)?;
        parse_candidate_payload(source, &fetched.bytes, fetched.content_type.as_deref())?
    } else {
        let path = Path::new(source);
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        parse_candidate_payload(source, &bytes, None)?
    };
    tracing::debug!(source, records = records.len(), "loaded candidate records");
    Ok(records)
}
