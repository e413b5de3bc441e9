//! Processor module for the dataset indexer.
//!
//! Turns raw dataset records into search documents. Each dataset has its own
//! processor; [`DatasetProcessor`] selects one of them for the whole run.

mod movie_processor;
mod sighting_processor;

pub use movie_processor::MovieProcessor;
pub use sighting_processor::SightingProcessor;

use std::path::Path;

use lazy_static::lazy_static;
use md5::{Digest, Md5};
use regex::Regex;
use thiserror::Error;

use crate::config::Dataset;
use crate::errors::IngestError;
use crate::loader::SearchLoader;
use dataset_indexer_shared::RunSummary;

/// A progress line is logged every this many records.
pub const PROGRESS_INTERVAL: usize = 1000;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"(?-u:\s)+").unwrap();
}

/// Why a raw record produced no document.
///
/// Skips are counted, never propagated: a bad record must not abort the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("not a JSON object: {0}")]
    InvalidJson(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("location '{0}' is not in 'City, ST' form")]
    UnmatchedLocation(String),
}

/// The processor for one dataset.
pub enum DatasetProcessor {
    Sightings(SightingProcessor),
    Movies(MovieProcessor),
}

impl DatasetProcessor {
    /// Select the processor for `dataset`.
    pub fn for_dataset(dataset: Dataset, verbose: bool) -> Self {
        match dataset {
            Dataset::Ufo => Self::Sightings(SightingProcessor::new(verbose)),
            Dataset::Movies => Self::Movies(MovieProcessor::new()),
        }
    }

    /// Read `source`, hand every resulting document to `loader` and report
    /// the counts.
    pub async fn add_documents(
        &self,
        source: &Path,
        loader: &SearchLoader,
    ) -> Result<RunSummary, IngestError> {
        match self {
            Self::Sightings(processor) => processor.add_documents(source, loader).await,
            Self::Movies(processor) => processor.add_documents(source, loader).await,
        }
    }
}

/// Lowercase hex MD5 digest of `text`.
pub(crate) fn md5_hex(text: &str) -> String {
    hex::encode(Md5::digest(text.as_bytes()))
}

/// `text` with every ASCII whitespace character removed.
pub(crate) fn remove_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, "").into_owned()
}

/// `text` with every run of ASCII whitespace replaced by a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}
