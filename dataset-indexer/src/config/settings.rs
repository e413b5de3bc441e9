//! Settings resolved from the process environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use dataset_indexer_repository::UpdateServiceConfig;
use dataset_indexer_shared::RunSummary;

use crate::IndexingError;

/// Default search service URL.
const DEFAULT_SEARCH_BASE_URL: &str = "http://localhost:9200/";

/// Default capacity of the update queue.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Default number of update workers.
const DEFAULT_UPDATE_THREADS_NUMBER: usize = 1;

/// Default directory holding the dataset resources.
const DEFAULT_DATA_DIR: &str = "data";

/// The datasets this indexer knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// UFO sighting reports, one JSON object per line.
    Ufo,
    /// Movie catalog, one JSON array of objects.
    Movies,
}

impl Dataset {
    /// Every known dataset, in the order they are listed to users.
    pub const ALL: [Dataset; 2] = [Dataset::Ufo, Dataset::Movies];

    /// Selector value of the dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Ufo => "ufo",
            Dataset::Movies => "movies",
        }
    }

    /// File name of the bundled resource for the dataset.
    pub fn resource_file_name(&self) -> &'static str {
        match self {
            Dataset::Ufo => "ufo_awesome.json",
            Dataset::Movies => "movies.json",
        }
    }

    /// Selector values formatted for error messages, e.g. `[ufo, movies]`.
    pub fn available_values() -> String {
        let values: Vec<&str> = Self::ALL.iter().map(Dataset::as_str).collect();
        format!("[{}]", values.join(", "))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                IndexingError::config(format!(
                    "DATA_SET has wrong value '{}'. Available values: {}",
                    s,
                    Self::available_values()
                ))
            })
    }
}

/// Configuration of one indexing run.
///
/// # Environment Variables
///
/// - `SEARCH_BASE_URL`: Search service URL (default: http://localhost:9200/)
/// - `BATCH_SIZE`: Capacity of the update queue (default: 500)
/// - `UPDATE_THREADS_NUMBER`: Number of update workers (default: 1)
/// - `BE_VERBOSE`: Log every skipped record when "true" (default: false)
/// - `DATA_SET`: Dataset to load, "ufo" or "movies" (required)
/// - `SEARCH_COLLECTION`: Target collection (default: the value of `DATA_SET`)
/// - `DATA_DIR`: Directory holding the dataset resources (default: data)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub search_base_url: String,
    pub batch_size: usize,
    pub update_threads_number: usize,
    pub verbose: bool,
    pub dataset: Dataset,
    pub collection: String,
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dataset = match get("DATA_SET") {
            Some(value) => value.parse::<Dataset>()?,
            None => {
                return Err(IndexingError::config(format!(
                    "Missing DATA_SET environment variable. Available values: {}",
                    Dataset::available_values()
                )))
            }
        };

        let mut search_base_url =
            get("SEARCH_BASE_URL").unwrap_or_else(|| DEFAULT_SEARCH_BASE_URL.to_string());
        if !search_base_url.ends_with('/') {
            search_base_url.push('/');
        }

        let batch_size = parse_count(get("BATCH_SIZE"), "BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let update_threads_number = parse_count(
            get("UPDATE_THREADS_NUMBER"),
            "UPDATE_THREADS_NUMBER",
            DEFAULT_UPDATE_THREADS_NUMBER,
        )?;

        let verbose = get("BE_VERBOSE").is_some_and(|v| v.eq_ignore_ascii_case("true"));

        let collection = get("SEARCH_COLLECTION").unwrap_or_else(|| dataset.as_str().to_string());

        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            search_base_url,
            batch_size,
            update_threads_number,
            verbose,
            dataset,
            collection,
            data_dir,
        })
    }

    /// Path of the resource for the selected dataset.
    pub fn resource_path(&self) -> PathBuf {
        self.data_dir.join(self.dataset.resource_file_name())
    }

    /// Update service limits derived from the settings.
    pub fn update_service_config(&self) -> UpdateServiceConfig {
        UpdateServiceConfig::new(self.batch_size, self.update_threads_number)
    }

    /// Resolved values labelled with the variables they come from.
    pub fn describe(&self) -> RunSummary {
        let mut info = RunSummary::new();
        info.push("  -   SEARCH_BASE_URL", self.search_base_url.clone());
        info.push("  -   BATCH_SIZE", self.batch_size.to_string());
        info.push(
            "  -   UPDATE_THREADS_NUMBER",
            self.update_threads_number.to_string(),
        );
        info.push("  -   DATA_SET", self.dataset.as_str());
        info.push("  -   SEARCH_COLLECTION", self.collection.clone());
        info.push("  -   DATA_DIR", self.data_dir.display().to_string());
        info.push("  -   BE_VERBOSE", self.verbose.to_string());
        info
    }
}

/// Parse a positive count, falling back to `default` when unset.
fn parse_count(value: Option<String>, key: &str, default: usize) -> Result<usize, IndexingError> {
    match value {
        None => Ok(default),
        Some(v) => match v.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(IndexingError::config(format!(
                "{} must be a positive integer, got '{}'",
                key, v
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, IndexingError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[("DATA_SET", "ufo")]).unwrap();

        assert_eq!(settings.search_base_url, "http://localhost:9200/");
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.update_threads_number, 1);
        assert!(!settings.verbose);
        assert_eq!(settings.dataset, Dataset::Ufo);
        assert_eq!(settings.collection, "ufo");
        assert_eq!(settings.resource_path(), PathBuf::from("data/ufo_awesome.json"));
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("DATA_SET", "movies"),
            ("SEARCH_BASE_URL", "http://search:9200"),
            ("BATCH_SIZE", "50"),
            ("UPDATE_THREADS_NUMBER", "4"),
            ("BE_VERBOSE", "TRUE"),
            ("SEARCH_COLLECTION", "films"),
            ("DATA_DIR", "/srv/datasets"),
        ])
        .unwrap();

        assert_eq!(settings.search_base_url, "http://search:9200/");
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.update_threads_number, 4);
        assert!(settings.verbose);
        assert_eq!(settings.dataset, Dataset::Movies);
        assert_eq!(settings.collection, "films");
        assert_eq!(
            settings.resource_path(),
            PathBuf::from("/srv/datasets/movies.json")
        );
        assert_eq!(settings.update_service_config().queue_size, 50);
        assert_eq!(settings.update_service_config().thread_count, 4);
    }

    #[test]
    fn test_missing_dataset() {
        let err = settings(&[]).unwrap_err();

        assert!(matches!(err, IndexingError::ConfigError(_)));
        assert!(err.to_string().contains("Missing DATA_SET"));
        assert!(err.to_string().contains("[ufo, movies]"));
    }

    #[test]
    fn test_unknown_dataset() {
        let err = settings(&[("DATA_SET", "books")]).unwrap_err();

        assert!(err.to_string().contains("wrong value 'books'"));
        assert!(err.to_string().contains("[ufo, movies]"));
    }

    #[test]
    fn test_blank_dataset_is_missing() {
        let err = settings(&[("DATA_SET", "  ")]).unwrap_err();

        assert!(err.to_string().contains("Missing DATA_SET"));
    }

    #[test]
    fn test_verbose_only_for_true() {
        assert!(!settings(&[("DATA_SET", "ufo"), ("BE_VERBOSE", "yes")])
            .unwrap()
            .verbose);
        assert!(settings(&[("DATA_SET", "ufo"), ("BE_VERBOSE", "true")])
            .unwrap()
            .verbose);
    }

    #[test]
    fn test_invalid_counts() {
        assert!(settings(&[("DATA_SET", "ufo"), ("BATCH_SIZE", "many")]).is_err());
        assert!(settings(&[("DATA_SET", "ufo"), ("UPDATE_THREADS_NUMBER", "0")]).is_err());
    }

    #[test]
    fn test_describe_lists_every_value() {
        let settings = settings(&[("DATA_SET", "movies")]).unwrap();

        let info = settings.describe();

        assert_eq!(info.len(), 7);
        assert_eq!(info.get("  -   DATA_SET"), Some("movies"));
        assert_eq!(info.get("  -   SEARCH_COLLECTION"), Some("movies"));
    }

    #[test]
    fn test_dataset_round_trip_names() {
        for dataset in Dataset::ALL {
            assert_eq!(dataset.as_str().parse::<Dataset>().unwrap(), dataset);
        }
    }
}
