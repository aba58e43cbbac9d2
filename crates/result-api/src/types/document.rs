use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured metadata attached to a result, such as the artist and album of
/// an audio file.
///
/// `schema` names the metadata family (`audio`, `video`, ...) and `fields`
/// maps field names to their textual values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub schema: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl ResultDocument {
    #[must_use]
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field value, replacing any previous value for the same field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// A document with no fields carries nothing worth indexing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(|value| value.trim().is_empty())
    }
}
