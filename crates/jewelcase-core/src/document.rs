//! CMS document model.
//!
//! Documents are owned by the CMS and arrive as JSON. Only the envelope is
//! typed; `data` stays an opaque object whose shape depends on the custom
//! type configured in the repository.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// A single CMS document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Repository-unique id.
    pub id: String,

    /// Optional human-readable identifier, unique per custom type.
    #[serde(default)]
    pub uid: Option<String>,

    /// Custom type name, e.g. `home`, `collection` or `product`.
    #[serde(rename = "type")]
    pub doc_type: String,

    /// Locale code such as `en-us`.
    #[serde(default)]
    pub lang: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Raw timestamp as returned by the API.
    #[serde(default)]
    pub first_publication_date: Option<String>,

    /// Raw timestamp as returned by the API.
    #[serde(default)]
    pub last_publication_date: Option<String>,

    /// Typed fields of the document.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Create an empty document of the given type.
    pub fn new(id: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uid: None,
            doc_type: doc_type.into(),
            lang: None,
            tags: Vec::new(),
            first_publication_date: None,
            last_publication_date: None,
            data: Map::new(),
        }
    }

    /// Set the uid.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Set a field in `data`.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.data.insert(name.into(), value);
        self
    }

    /// Decode a document from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Raw value of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name).filter(|v| !v.is_null())
    }

    /// Text of a field.
    ///
    /// Plain string fields are returned as-is. For rich text and title fields
    /// the text of the first block is returned.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        first_text(self.field(name)?)
    }

    /// A link field, when it points at something.
    ///
    /// Empty link fields come back from the API as `{"link_type": "Any"}`.
    #[must_use]
    pub fn link(&self, name: &str) -> Option<&Map<String, Value>> {
        let link = self.field(name)?.as_object()?;
        match link.get("link_type").and_then(Value::as_str) {
            Some("Any") => None,
            _ => Some(link),
        }
    }

    /// A field of a document resolved inline through a link field.
    ///
    /// Only fields requested with `fetchLinks` are present on the linked
    /// document.
    #[must_use]
    pub fn linked_field(&self, link: &str, name: &str) -> Option<&Value> {
        self.link(link)?
            .get("data")?
            .as_object()?
            .get(name)
            .filter(|v| !v.is_null())
    }

    /// Text of a field resolved inline through a link field.
    #[must_use]
    pub fn linked_text(&self, link: &str, name: &str) -> Option<&str> {
        first_text(self.linked_field(link, name)?)
    }

    /// Items of a group field. Missing groups are empty.
    pub fn group(&self, name: &str) -> impl Iterator<Item = &Map<String, Value>> {
        self.field(name)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }
}

/// Text of a string value or of the first block of a rich text value.
pub fn first_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(blocks) => blocks
            .iter()
            .find_map(|block| block.get("text").and_then(Value::as_str)),
        _ => None,
    }
}
