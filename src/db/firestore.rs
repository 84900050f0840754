// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of [`DocumentStore`].
//!
//! Documents are read and written as untyped field maps; the typed mapping
//! lives in `models`. Document ids come back through the `_firestore_id`
//! pseudo-field the `firestore` crate adds on deserialization.

use super::{CollectionRef, Document, DocumentStore, Filter, StoreError};
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;
use std::time::Duration;

/// Polling interval for document subscriptions.
const WATCH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Prefix of pseudo-fields injected by the `firestore` crate.
const FIRESTORE_META_PREFIX: &str = "_firestore_";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // The emulator rejects real credentials, so hand it a dummy token.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Resolve the parent document path of a collection.
    fn parent_path(&self, collection: &CollectionRef) -> Result<String, StoreError> {
        match &collection.parent {
            Some((parent_col, parent_id)) => {
                let path = self
                    .client
                    .parent_path(parent_col, parent_id.as_str())
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                Ok(AsRef::<str>::as_ref(&path).to_string())
            }
            None => Ok(self.client.get_documents_path().clone()),
        }
    }
}

/// Split the pseudo-fields off a fetched document, returning its id.
fn strip_metadata(mut doc: Document) -> Result<(String, Document), StoreError> {
    let id = match doc.get("_firestore_id") {
        Some(Value::String(id)) => id.clone(),
        _ => {
            return Err(StoreError::Backend(
                "Firestore document without id".to_string(),
            ))
        }
    };
    doc.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));
    Ok((id, doc))
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend_tag(&self) -> &'static str {
        "firestore"
    }

    async fn get_all(
        &self,
        collection: &CollectionRef,
        filters: &[Filter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let parent = self.parent_path(collection)?;

        let docs: Vec<Document> = self
            .client
            .fluent()
            .select()
            .from(collection.name)
            .parent(&parent)
            .filter(|q| {
                q.for_all(filters.iter().map(|f| match f {
                    Filter::Eq(field, value) => q.field(*field).eq(value.clone()),
                    Filter::ArrayContains(field, value) => {
                        q.field(*field).array_contains(value.clone())
                    }
                }))
            })
            .obj()
            .query()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        docs.into_iter().map(strip_metadata).collect()
    }

    async fn get(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let parent = self.parent_path(collection)?;

        let doc: Option<Document> = self
            .client
            .fluent()
            .select()
            .by_id_in(collection.name)
            .parent(&parent)
            .obj()
            .one(id)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        doc.map(|d| strip_metadata(d).map(|(_, fields)| fields))
            .transpose()
    }

    async fn set(
        &self,
        collection: &CollectionRef,
        id: &str,
        doc: Document,
    ) -> Result<(), StoreError> {
        let parent = self.parent_path(collection)?;

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collection.name)
            .document_id(id)
            .parent(&parent)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(collection = %collection, id, "Document written");
        Ok(())
    }

    async fn update(
        &self,
        collection: &CollectionRef,
        id: &str,
        partial: Document,
    ) -> Result<(), StoreError> {
        // A masked update would create the document; keep update-only semantics.
        if self.get(collection, id).await?.is_none() {
            return Err(StoreError::NotFound(format!("{}/{}", collection, id)));
        }

        let parent = self.parent_path(collection)?;
        let field_names: Vec<String> = partial.keys().cloned().collect();

        let _: () = self
            .client
            .fluent()
            .update()
            .fields(field_names)
            .in_col(collection.name)
            .document_id(id)
            .parent(&parent)
            .object(&partial)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(collection = %collection, id, "Document fields updated");
        Ok(())
    }

    async fn delete(&self, collection: &CollectionRef, id: &str) -> Result<(), StoreError> {
        let parent = self.parent_path(collection)?;

        self.client
            .fluent()
            .delete()
            .from(collection.name)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(collection = %collection, id, "Document deleted");
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        let parent = self.parent_path(collection)?;

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collection.name)
            .document_id(id)
            .parent(&parent)
            .transforms(|t| t.fields([t.field(field).append_missing_elements(values.clone())]))
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Backend(format!("Failed to add array union to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Transaction commit failed: {}", e)))?;
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: &CollectionRef,
        id: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<(), StoreError> {
        let parent = self.parent_path(collection)?;

        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to begin transaction: {}", e)))?;

        self.client
            .fluent()
            .update()
            .in_col(collection.name)
            .document_id(id)
            .parent(&parent)
            .transforms(|t| t.fields([t.field(field).remove_all_from_array(values.clone())]))
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                StoreError::Backend(format!("Failed to add array removal to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| StoreError::Backend(format!("Transaction commit failed: {}", e)))?;
        Ok(())
    }

    async fn watch(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> Result<BoxStream<'static, Result<Option<Document>, StoreError>>, StoreError> {
        let store = self.clone();
        let collection = collection.clone();
        let id = id.to_string();

        // Poll and emit only when the document differs from the last snapshot.
        let updates = stream::unfold(
            (store, collection, id, None::<Option<Document>>, false),
            |(store, collection, id, mut last, mut polled)| async move {
                loop {
                    if polled {
                        tokio::time::sleep(WATCH_POLL_INTERVAL).await;
                    }
                    polled = true;
                    match store.get(&collection, &id).await {
                        Ok(current) => {
                            if last.as_ref() == Some(&current) {
                                continue;
                            }
                            last = Some(current.clone());
                            return Some((Ok(current), (store, collection, id, last, polled)));
                        }
                        Err(e) => {
                            tracing::warn!(collection = %collection, id = %id, error = %e, "Watch poll failed");
                            return Some((Err(e), (store, collection, id, last, polled)));
                        }
                    }
                }
            },
        );
        Ok(updates.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_metadata() {
        let doc = json!({
            "_firestore_id": "pumas",
            "_firestore_full_id": "projects/p/databases/(default)/documents/equipos/pumas",
            "nombre": "Pumas",
        })
        .as_object()
        .cloned()
        .unwrap();

        let (id, fields) = strip_metadata(doc).unwrap();
        assert_eq!(id, "pumas");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["nombre"], "Pumas");
    }

    #[test]
    fn test_strip_metadata_requires_id() {
        let doc = json!({"nombre": "Pumas"}).as_object().cloned().unwrap();
        assert!(strip_metadata(doc).is_err());
    }
}
