//! OpenSearch index configuration and mappings.
//!
//! Document producers name their fields with type suffixes (`city_s`,
//! `sighted_at_dt`, `sighting_en`); the mappings here turn those suffixes
//! into field types through dynamic templates, so one index definition
//! serves every dataset.

use serde_json::{json, Value};

/// Configuration for collections created by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Number of primary shards for a newly created collection.
    pub number_of_shards: u32,
    /// Number of replicas for a newly created collection.
    pub number_of_replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 0,
        }
    }
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `number_of_shards` - Primary shard count
    /// * `number_of_replicas` - Replica count
    pub fn new(number_of_shards: u32, number_of_replicas: u32) -> Self {
        Self {
            number_of_shards,
            number_of_replicas,
        }
    }
}

/// Get the index settings and mappings for a dataset collection.
///
/// The configuration includes:
/// - **id**: keyword, used for exact lookups
/// - **`*_s`**: keyword fields for faceting (city, state, shape, month)
/// - **`*_dt`**: date fields
/// - **`*_en`**: full-text fields analyzed in English
///
/// Fields without a suffix (the movie catalog) fall back to dynamic mapping.
pub fn get_index_settings(config: &IndexConfig) -> Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas
        },
        "mappings": {
            "dynamic_templates": [
                {
                    "strings_as_keywords": {
                        "match": "*_s",
                        "mapping": { "type": "keyword" }
                    }
                },
                {
                    "dates": {
                        "match": "*_dt",
                        "mapping": { "type": "date" }
                    }
                },
                {
                    "english_text": {
                        "match": "*_en",
                        "mapping": { "type": "text", "analyzer": "english" }
                    }
                }
            ],
            "properties": {
                "id": {
                    "type": "keyword"
                }
            }
        }
    })
}
