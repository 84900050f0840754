// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (remote document store).
//!
//! Services talk to the store through [`DocumentStore`] so the Firestore
//! client and the in-memory store are interchangeable.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::fmt;

/// Collection names as constants.
pub mod collections {
    pub const TEAMS: &str = "equipos";
    /// Sub-collection under each team document.
    pub const CATEGORIES: &str = "categorias";
    pub const PLAYERS: &str = "jugadores";
    pub const ATTENDANCE: &str = "asistencias";
}

/// A stored document: field name to JSON-compatible value.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Location of a collection, optionally nested under a parent document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub name: &'static str,
    pub parent: Option<(&'static str, String)>,
}

impl CollectionRef {
    pub fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    pub fn nested(parent_collection: &'static str, parent_id: &str, name: &'static str) -> Self {
        Self {
            name,
            parent: Some((parent_collection, parent_id.to_string())),
        }
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some((col, id)) => write!(f, "{}/{}/{}", col, id, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Query filter on a single string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(&'static str, String),
    ArrayContains(&'static str, String),
}

impl Filter {
    /// Check the filter against a document.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq(field, value) => doc.get(*field).and_then(|v| v.as_str()) == Some(value),
            Filter::ArrayContains(field, value) => doc
                .get(*field)
                .and_then(|v| v.as_array())
                .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(value))),
        }
    }
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

/// Operations the services need from the remote document store.
///
/// Writes are last-write-wins per document; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name for logs.
    fn backend_tag(&self) -> &'static str;

    /// Fetch every document of a collection matching all filters, as
    /// `(id, fields)` pairs in store order.
    async fn get_all(
        &self,
        collection: &CollectionRef,
        filters: &[Filter],
    ) -> Result<Vec<(String, Document)>, StoreError>;

    async fn get(&self, collection: &CollectionRef, id: &str)
        -> Result<Option<Document>, StoreError>;

    /// Create or fully overwrite a document.
    async fn set(&self, collection: &CollectionRef, id: &str, doc: Document)
        -> Result<(), StoreError>;

    /// Overwrite the named fields of an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError>;

    /// Append each value to an array field unless already present.
    async fn array_union(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError>;

    /// Remove every occurrence of each value from an array field.
    async fn array_remove(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError>;

    /// Subscribe to one document. Yields its current state first, then one
    /// item per change (`None` once deleted).
    async fn watch(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<BoxStream<'static, Result<Option<Document>, StoreError>>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_filter() {
        let d = doc(json!({"categoria": "Senior", "peso": "90"}));
        assert!(Filter::Eq("categoria", "Senior".into()).matches(&d));
        assert!(!Filter::Eq("categoria", "M19".into()).matches(&d));
        assert!(!Filter::Eq("missing", "Senior".into()).matches(&d));
    }

    #[test]
    fn test_array_contains_filter() {
        let d = doc(json!({"categorias": ["M19", "Senior"]}));
        assert!(Filter::ArrayContains("categorias", "Senior".into()).matches(&d));
        assert!(!Filter::ArrayContains("categorias", "M15".into()).matches(&d));
        assert!(!Filter::ArrayContains("nombre", "Senior".into()).matches(&d));
    }

    #[test]
    fn test_collection_display() {
        assert_eq!(CollectionRef::root(collections::PLAYERS).to_string(), "jugadores");
        assert_eq!(
            CollectionRef::nested(collections::TEAMS, "pumas", collections::CATEGORIES).to_string(),
            "equipos/pumas/categorias"
        );
    }
}
