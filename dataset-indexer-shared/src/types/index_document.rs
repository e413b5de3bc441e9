//! Document types for the search index.
//!
//! This module defines the flat document structure that is indexed in the search engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field in the serialized document.
pub const ID_FIELD: &str = "id";

/// Document representation for the search index.
///
/// A document is a flat mapping from field name to a scalar or list value plus a
/// mandatory unique identifier. It serializes to a single JSON object whose `id`
/// key carries the identifier and whose remaining keys are the fields.
///
/// # Fields
///
/// - `id`: Unique, content-derived identifier of the document
/// - `fields`: Field values keyed by field name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl IndexDocument {
    /// Create a new document with no fields.
    ///
    /// # Example
    ///
    /// ```
    /// use dataset_indexer_shared::IndexDocument;
    ///
    /// let doc = IndexDocument::new("the matrix/1999/abc")
    ///     .with_field("title", "The Matrix")
    ///     .with_field("year", 1999);
    /// assert_eq!(doc.field("year"), Some(&serde_json::json!(1999)));
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Set a field value, replacing any previous value.
    ///
    /// The `id` name is reserved for the identifier and is ignored here.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if name == ID_FIELD {
            return;
        }
        self.fields.insert(name, value.into());
    }

    /// Builder form of [`IndexDocument::set_field`].
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a field value as a string slice, if it is a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}
