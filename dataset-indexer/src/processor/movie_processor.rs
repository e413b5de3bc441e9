//! Movie catalog processor.
//!
//! Every record of the catalog becomes a document; there is no skip path.
//! The catalog carries no rating, so one is synthesized from the record.

use std::path::Path;

use md5::{Digest, Md5};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::{md5_hex, remove_whitespace, PROGRESS_INTERVAL};
use crate::consumer::read_json_array;
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use dataset_indexer_shared::{IndexDocument, RunSummary};

/// Summary label of the movies run.
pub const SUMMARY_LABEL: &str = "Movies indexing info";

/// Fields copied verbatim from the record.
const COPIED_FIELDS: [&str; 5] = ["title", "year", "cast", "genres", "extract"];

const BASE_DIVISOR: f64 = 5.5;
const DIVISOR_STEP: f64 = 0.1;
const MAX_DIVISOR_STEPS: u32 = 5;

/// Processor for the movie catalog.
#[derive(Debug, Default)]
pub struct MovieProcessor;

impl MovieProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Decode the catalog at `source` and load every movie.
    #[instrument(skip(self, loader), fields(source = %source.display()))]
    pub async fn add_documents(
        &self,
        source: &Path,
        loader: &SearchLoader,
    ) -> Result<RunSummary, IngestError> {
        let records = read_json_array(source).await?;
        let mut sent = 0usize;

        for record in &records {
            loader.load(self.process_record(record)).await?;
            sent += 1;

            if sent % PROGRESS_INTERVAL == 0 {
                info!("Processed {} documents.", sent);
            }
        }

        info!(sent = sent, "Finished reading movies");

        let mut summary = RunSummary::new();
        summary.push(SUMMARY_LABEL, format!("Sent {} documents", sent));
        Ok(summary)
    }

    /// Build the document for one catalog record.
    pub fn process_record(&self, record: &Map<String, Value>) -> IndexDocument {
        let mut doc = IndexDocument::new(movie_id(record));

        for field in COPIED_FIELDS {
            if let Some(value) = record.get(field).filter(|v| !v.is_null()) {
                doc.set_field(field, value.clone());
            }
        }

        doc.set_field("rating", compute_rating(record));
        doc
    }
}

/// Identifier of a movie: title without whitespace, year and a digest of the
/// extract, slash-joined and lowercased.
pub fn movie_id(record: &Map<String, Value>) -> String {
    let title = match record.get("title") {
        None | Some(Value::Null) => String::new(),
        Some(title) => remove_whitespace(&scalar_text(Some(title))),
    };

    format!(
        "{}/{}/{}",
        title,
        scalar_text(record.get("year")),
        md5_hex(&scalar_text(record.get("extract")))
    )
    .to_lowercase()
}

/// Text of a JSON value as it appears in identifiers; absent values read as `null`.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        None => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Synthesized rating of a movie record, in `[0.0, 9.9]` with one decimal.
pub fn compute_rating(record: &Map<String, Value>) -> f64 {
    rating_for_hash(record_hash(record))
}

/// Stable 32-bit hash of a record: the first four bytes of the MD5 digest of
/// its canonical JSON encoding.
pub fn record_hash(record: &Map<String, Value>) -> i32 {
    let mut canonical = String::new();
    write_canonical_object(record, &mut canonical);
    let digest = Md5::digest(canonical.as_bytes());
    i32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Derive a rating from `hash`, moving to the next divisor while the rating
/// rounds to zero.
pub fn rating_for_hash(hash: i32) -> f64 {
    (0..=MAX_DIVISOR_STEPS)
        .map(|step| BASE_DIVISOR + DIVISOR_STEP * f64::from(step))
        .map(|divisor| round_one_decimal((f64::from(hash) / divisor).abs() % 10.0) % 10.0)
        .find(|rating| *rating != 0.0)
        .unwrap_or(0.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compact JSON with object keys sorted at every level.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => write_canonical_object(map, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_canonical_object(map: &Map<String, Value>, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String(key.clone()).to_string());
        out.push(':');
        write_canonical(&map[key.as_str()], out);
    }
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn alien() -> Map<String, Value> {
        record(json!({
            "title": "Alien Resurrection",
            "year": 1997,
            "cast": ["Sigourney Weaver", "Winona Ryder"],
            "genres": ["Science Fiction"],
            "extract": "Two hundred years later."
        }))
    }

    #[test]
    fn test_document_fields() {
        let doc = MovieProcessor::new().process_record(&alien());

        assert_eq!(doc.str_field("title"), Some("Alien Resurrection"));
        assert_eq!(doc.field("year"), Some(&json!(1997)));
        assert_eq!(
            doc.field("cast"),
            Some(&json!(["Sigourney Weaver", "Winona Ryder"]))
        );
        assert_eq!(doc.field("genres"), Some(&json!(["Science Fiction"])));
        assert_eq!(doc.str_field("extract"), Some("Two hundred years later."));
        assert!(doc.field("rating").and_then(Value::as_f64).is_some());
    }

    #[test]
    fn test_identifier() {
        let id = movie_id(&alien());

        assert_eq!(
            id,
            format!("alienresurrection/1997/{}", md5_hex("Two hundred years later."))
        );
    }

    #[test]
    fn test_identifier_for_sparse_record() {
        let id = movie_id(&record(json!({ "title": null })));

        assert_eq!(id, format!("/null/{}", md5_hex("null")));
    }

    #[test]
    fn test_identifier_is_stable() {
        assert_eq!(movie_id(&alien()), movie_id(&alien()));
    }

    #[test]
    fn test_null_fields_are_not_copied() {
        let doc = MovieProcessor::new().process_record(&record(json!({
            "title": "Untitled",
            "year": 2020,
            "cast": null,
            "genres": []
        })));

        assert!(doc.field("cast").is_none());
        assert!(doc.field("extract").is_none());
        assert_eq!(doc.field("genres"), Some(&json!([])));
    }

    #[test]
    fn test_rating_for_hash() {
        assert_eq!(rating_for_hash(0), 0.0);
        assert_eq!(rating_for_hash(11), 2.0);
        assert_eq!(rating_for_hash(-11), 2.0);
        // 55 / 5.5 is exactly 10, which wraps to zero; 55 / 5.6 rounds to 9.8.
        assert_eq!(rating_for_hash(55), 9.8);
    }

    #[test]
    fn test_rating_range() {
        let mut hash = i32::MIN;
        loop {
            let rating = rating_for_hash(hash);
            assert!((0.0..=9.9).contains(&rating), "rating {} for {}", rating, hash);
            assert!(((rating * 10.0).round() - rating * 10.0).abs() < 1e-9);

            match hash.checked_add(7_919_993) {
                Some(next) => hash = next,
                None => break,
            }
        }
    }

    #[test]
    fn test_rating_is_deterministic() {
        assert_eq!(compute_rating(&alien()), compute_rating(&alien()));
    }

    #[test]
    fn test_record_hash_ignores_key_order() {
        let a = record(json!({ "title": "A", "year": 1990, "cast": [{"b": 1, "a": 2}] }));
        let mut b = Map::new();
        b.insert("year".to_string(), json!(1990));
        b.insert("cast".to_string(), json!([{"a": 2, "b": 1}]));
        b.insert("title".to_string(), json!("A"));

        assert_eq!(record_hash(&a), record_hash(&b));
    }

    #[test]
    fn test_canonical_encoding() {
        let mut out = String::new();
        write_canonical(&json!({ "b": [1, "x"], "a": { "d": null, "c": true } }), &mut out);

        assert_eq!(out, r#"{"a":{"c":true,"d":null},"b":[1,"x"]}"#);
    }
}
