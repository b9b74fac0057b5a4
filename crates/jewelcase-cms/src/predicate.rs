//! Query predicates.
//!
//! A predicate renders to the CMS query syntax, e.g.
//! `[at(document.type, "collection")]`. A query combines predicates with AND
//! by wrapping them in one more pair of brackets.

use std::fmt;

/// An equality filter: the field at `path` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: String,
    pub value: String,
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// `document.type` equals `doc_type`.
    pub fn document_type(doc_type: impl Into<String>) -> Self {
        Self::at("document.type", doc_type)
    }

    /// The uid of a `doc_type` document equals `uid`.
    pub fn uid(doc_type: &str, uid: impl Into<String>) -> Self {
        Self::at(format!("my.{doc_type}.uid"), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.replace('\\', "\\\\").replace('"', "\\\"");
        write!(f, "[at({}, \"{value}\")]", self.path)
    }
}

/// Render the `q` parameter for a set of predicates.
pub fn to_query(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(ToString::to_string).collect();
    format!("[{inner}]")
}
