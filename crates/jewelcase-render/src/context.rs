//! Per-request view context.
//!
//! Maps the names a view expects (`home`, `metadata`, `collections`, ...) to
//! the documents fetched for the request. Built by the route handler,
//! consumed by the renderer, dropped with the response.

use std::collections::BTreeMap;

use jewelcase_core::Document;

use crate::error::{RenderError, Result};

/// A context entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Document(Document),
    Documents(Vec<Document>),
}

impl From<Document> for ContextValue {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<Vec<Document>> for ContextValue {
    fn from(docs: Vec<Document>) -> Self {
        Self::Documents(docs)
    }
}

/// Documents available to one view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewContext {
    entries: BTreeMap<String, ContextValue>,
}

impl ViewContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single document stored under `key`.
    pub fn document(&self, key: &str) -> Result<&Document> {
        match self.get(key) {
            Some(ContextValue::Document(doc)) => Ok(doc),
            Some(ContextValue::Documents(_)) => Err(RenderError::WrongShape {
                key: key.to_string(),
                expected: "a document",
            }),
            None => Err(RenderError::MissingKey(key.to_string())),
        }
    }

    /// The document list stored under `key`.
    pub fn documents(&self, key: &str) -> Result<&[Document]> {
        match self.get(key) {
            Some(ContextValue::Documents(docs)) => Ok(docs),
            Some(ContextValue::Document(_)) => Err(RenderError::WrongShape {
                key: key.to_string(),
                expected: "a document list",
            }),
            None => Err(RenderError::MissingKey(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lookup() {
        let ctx = ViewContext::new()
            .with("home", Document::new("H", "home"))
            .with("collections", Vec::<Document>::new());

        assert_eq!(ctx.document("home").unwrap().id, "H");
        assert!(ctx.documents("collections").unwrap().is_empty());
        assert_eq!(ctx.keys().collect::<Vec<_>>(), ["collections", "home"]);
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_missing_and_wrong_shape() {
        let ctx = ViewContext::new().with("home", Document::new("H", "home"));

        assert!(matches!(ctx.document("metadata"), Err(RenderError::MissingKey(k)) if k == "metadata"));
        assert!(matches!(ctx.documents("home"), Err(RenderError::WrongShape { .. })));
    }
}
