//! UFO sighting processor.
//!
//! Reads one JSON object per line and keeps only sightings with a valid date
//! and a US-style `City, ST` location.

use std::path::Path;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::{collapse_whitespace, md5_hex, remove_whitespace, SkipReason, PROGRESS_INTERVAL};
use crate::consumer::LineReader;
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use dataset_indexer_shared::{IndexDocument, RunSummary};

/// Summary label of the sightings run.
pub const SUMMARY_LABEL: &str = "Ufo indexing info";

lazy_static! {
    static ref US_CITY_AND_STATE: Regex = Regex::new(r"^([^,]+),(?-u:\s)([A-Z]{2})$").unwrap();
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r#"([a-z"'])([.?!,;])([A-Z])"#).unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
}

/// Processor for the UFO sightings dataset.
pub struct SightingProcessor {
    verbose: bool,
}

impl SightingProcessor {
    /// Create a processor; `verbose` logs every skipped line.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Stream `source` line by line and load every valid sighting.
    #[instrument(skip(self, loader), fields(source = %source.display()))]
    pub async fn add_documents(
        &self,
        source: &Path,
        loader: &SearchLoader,
    ) -> Result<RunSummary, IngestError> {
        let mut reader = LineReader::open(source).await?;
        let mut sent = 0usize;
        let mut skipped = 0usize;

        while let Some((line_num, line)) = reader.next_line().await? {
            match self.process_line(&line) {
                Ok(doc) => {
                    loader.load(doc).await?;
                    sent += 1;
                }
                Err(reason) => {
                    skipped += 1;
                    if self.verbose {
                        warn!(line = line_num, reason = %reason, raw = %line, "Skipped sighting");
                    }
                    continue;
                }
            }

            if line_num % PROGRESS_INTERVAL == 0 {
                info!("Processed {} documents.", line_num);
            }
        }

        info!(sent = sent, skipped = skipped, "Finished reading sightings");

        let mut summary = RunSummary::new();
        summary.push(
            SUMMARY_LABEL,
            format!("Sent {} documents (skipped {})", sent, skipped),
        );
        Ok(summary)
    }

    /// Turn one line into a document, or say why it was skipped.
    pub fn process_line(&self, line: &str) -> Result<IndexDocument, SkipReason> {
        let record = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => record,
            Ok(other) => return Err(SkipReason::InvalidJson(format!("found {}", other))),
            Err(e) => return Err(SkipReason::InvalidJson(e.to_string())),
        };

        let sighted_at = read_field(&record, "sighted_at");
        let location = read_field(&record, "location");
        let description = read_field(&record, "description");

        let (sighted_at, location, description) = match (sighted_at, location, description) {
            (Some(s), Some(l), Some(d)) => (s, l, d),
            (None, _, _) => return Err(SkipReason::MissingField("sighted_at")),
            (_, None, _) => return Err(SkipReason::MissingField("location")),
            (_, _, None) => return Err(SkipReason::MissingField("description")),
        };

        let sighted_on =
            parse_date(sighted_at).ok_or_else(|| SkipReason::InvalidDate(sighted_at.to_string()))?;

        let (city, state) = split_location(location)
            .ok_or_else(|| SkipReason::UnmatchedLocation(location.to_string()))?;

        let description = normalize_description(description);

        let reported_at = read_field(&record, "reported_at");
        let shape = read_field(&record, "shape");
        let duration = read_field(&record, "duration");

        let id = sighting_id(
            sighted_at,
            reported_at,
            city,
            state,
            shape,
            &description,
        );

        let mut doc = IndexDocument::new(id)
            .with_field("sighted_at_dt", format_date(sighted_on))
            .with_field("month_s", sighted_on.format("%B").to_string());

        if let Some(reported_on) = reported_at.and_then(parse_date) {
            doc.set_field("reported_at_dt", format_date(reported_on));
        }

        doc.set_field("city_s", city);
        doc.set_field("state_s", state);
        doc.set_field("location_s", location);

        if let Some(shape) = shape {
            doc.set_field("shape_s", shape);
        }
        if let Some(duration) = duration {
            doc.set_field("duration_s", duration);
        }

        doc.set_field("sighting_en", description);
        Ok(doc)
    }
}

/// Trimmed string value of `key`; absent, blank and non-string values are `None`.
fn read_field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Parse a compact `YYYYMMDD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// UTC midnight of `date` as an RFC 3339 timestamp.
fn format_date(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

/// Split `City, ST` into its city and state.
pub fn split_location(location: &str) -> Option<(&str, &str)> {
    let caps = US_CITY_AND_STATE.captures(location)?;
    let city = caps.get(1)?.as_str();
    let state = caps.get(2)?.as_str();
    Some((city, state))
}

/// Clean up a sighting description for display.
///
/// Decodes the escaped quote, ampersand and apostrophe, collapses whitespace
/// and puts back the spaces lost between sentences and between words.
pub fn normalize_description(description: &str) -> String {
    let text = description
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&apos;", "'");
    let text = collapse_whitespace(&text);
    let text = SENTENCE_BOUNDARY.replace_all(&text, "$1$2 $3");
    WORD_BOUNDARY.replace_all(&text, "$1 $2").into_owned()
}

/// Composite identifier of a sighting.
fn sighting_id(
    sighted_at: &str,
    reported_at: Option<&str>,
    city: &str,
    state: &str,
    shape: Option<&str>,
    description: &str,
) -> String {
    format!(
        "{}/{}/{}/{}/{}/{}",
        sighted_at,
        reported_at.unwrap_or("?"),
        remove_whitespace(city),
        state,
        shape.unwrap_or("?"),
        md5_hex(description)
    )
    .to_lowercase()
}
