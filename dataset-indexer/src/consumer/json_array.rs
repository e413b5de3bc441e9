//! Reader for resources holding a single JSON array of objects.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::IngestError;

/// Read the file at `path` and decode it as an array of JSON objects.
pub async fn read_json_array(path: &Path) -> Result<Vec<Map<String, Value>>, IngestError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        IngestError::SourceError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;

    let records = parse_json_array(&bytes)
        .map_err(|e| IngestError::parse(format!("{}: {}", path.display(), e)))?;

    debug!(path = %path.display(), records = records.len(), "Read JSON array");
    Ok(records)
}

/// Decode `bytes` as an array of JSON objects.
///
/// Any element that is not an object fails the whole decode.
pub fn parse_json_array(bytes: &[u8]) -> Result<Vec<Map<String, Value>>, IngestError> {
    Ok(serde_json::from_slice(bytes)?)
}
