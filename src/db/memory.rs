// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local document store.
//!
//! Used by tests and by `STORE_BACKEND=memory` for local development.
//! Documents are kept per collection path in id order.

use super::{CollectionRef, Document, DocumentStore, Filter, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::watch;

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct InMemoryStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
    watchers: DashMap<String, watch::Sender<Option<Document>>>,
    /// Collection paths whose writes fail (failure injection for tests).
    failing: std::sync::Mutex<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to the given collection paths fail.
    ///
    /// Paths use the display form, e.g. `equipos` or `equipos/pumas/categorias`.
    pub fn set_failing_collections<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        let mut guard = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        guard.clear();
        guard.extend(paths.into_iter().map(str::to_string));
    }

    /// Number of documents with an open watch channel.
    pub fn watched_documents(&self) -> usize {
        self.watchers.len()
    }

    /// Number of documents currently stored in a collection.
    pub fn count(&self, collection: &CollectionRef) -> usize {
        self.collections
            .get(&collection.to_string())
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    fn check_writable(&self, collection: &CollectionRef) -> Result<(), StoreError> {
        let path = collection.to_string();
        let guard = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if guard.contains(&path) {
            return Err(StoreError::Backend(format!("injected write failure on {}", path)));
        }
        Ok(())
    }

    fn notify(&self, collection: &CollectionRef, id: &str, state: Option<Document>) {
        let key = format!("{}/{}", collection, id);
        // Drop channels nobody listens to any more.
        if self
            .watchers
            .remove_if(&key, |_, sender| sender.receiver_count() == 0)
            .is_some()
        {
            return;
        }
        if let Some(sender) = self.watchers.get(&key) {
            sender.send_replace(state);
        }
    }

    fn modify_array(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        apply: impl FnOnce(&mut Vec<Value>),
    ) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        let path = collection.to_string();
        let updated = {
            let mut docs = self.collections.entry(path).or_default();
            let doc = docs.entry(id.to_string()).or_default();
            let mut items = match doc.remove(field) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            apply(&mut items);
            doc.insert(field.to_string(), Value::Array(items));
            doc.clone()
        };
        self.notify(collection, id, Some(updated));
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_all(
        &self,
        collection: &CollectionRef,
        filters: &[Filter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let Some(docs) = self.collections.get(&collection.to_string()) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|(_, doc)| filters.iter().all(|f| f.matches(doc)))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    async fn get(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(&collection.to_string())
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn set(
        &self,
        collection: &CollectionRef,
        id: &str,
        doc: Document,
    ) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc.clone());
        self.notify(collection, id, Some(doc));
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        let updated = {
            let mut docs = self
                .collections
                .get_mut(&collection.to_string())
                .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
            let doc = docs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
            doc.extend(partial);
            doc.clone()
        };
        self.notify(collection, id, Some(updated));
        Ok(())
    }

    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError> {
        self.check_writable(collection)?;
        if let Some(mut docs) = self.collections.get_mut(&collection.to_string()) {
            docs.remove(id);
        }
        self.notify(collection, id, None);
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        self.modify_array(collection, id, field, |items| {
            for value in values {
                let value = Value::String(value);
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        })
    }

    async fn array_remove(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        self.modify_array(collection, id, field, |items| {
            items.retain(|item| !values.iter().any(|v| item.as_str() == Some(v.as_str())));
        })
    }

    async fn watch(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<BoxStream<'static, Result<Option<Document>, StoreError>>, StoreError> {
        let current = self.get(collection, id).await?;
        let key = format!("{}/{}", collection, id);
        let rx = self
            .watchers
            .entry(key)
            .or_insert_with(|| watch::channel(current).0)
            .subscribe();

        let updates = stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let state = rx.borrow_and_update().clone();
            Some((Ok(state), (rx, false)))
        });
        Ok(updates.boxed())
    }
}
