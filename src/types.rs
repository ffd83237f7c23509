//! Schema draft data model.
//!
//! Inference produces a [`SchemaDraft`]: an ordered list of [`FieldDescriptor`]s whose names were
//! discovered from the source file. Type, title and descriptions are left unset for a cataloger
//! to curate later.

use serde::{Deserialize, Serialize};

/// A single discovered field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name as found in the source.
    pub name: String,
    /// Field type. Never set by inference.
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    /// Free-text description. Never set by inference.
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Create a descriptor with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            description: None,
        }
    }
}

/// A proposed schema for one dataset file.
///
/// Serializes to the document shape handed to the persistence layer:
///
/// ```json
/// {"title": null, "type": null, "properties": [{"name": "a", "type": null, "description": null}]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDraft {
    /// Schema title. Never set by inference.
    pub title: Option<String>,
    /// Schema type. Never set by inference.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    /// Discovered fields, in the order the extractor produced them.
    pub properties: Vec<FieldDescriptor>,
}

impl SchemaDraft {
    /// Wrap discovered names into a draft, one property per name, preserving order.
    ///
    /// ```
    /// use catalog_ingest::types::SchemaDraft;
    ///
    /// let draft = SchemaDraft::from_field_names(["id", "name"]);
    /// assert_eq!(draft.field_names().collect::<Vec<_>>(), vec!["id", "name"]);
    /// assert!(draft.title.is_none());
    /// ```
    pub fn from_field_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            schema_type: None,
            properties: names.into_iter().map(FieldDescriptor::new).collect(),
        }
    }

    /// Iterate property names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no field names were discovered.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Serialize to the JSON document shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
