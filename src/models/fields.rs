// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mapping between typed records and stored field maps.
//!
//! Field keys are fixed by data already in the store, so every model uses
//! explicit `#[serde(rename)]` keys. Optional text fields are stored as `""`
//! rather than null; [`empty_as_none`] converts at this boundary.

use crate::db::Document;
use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// A typed record stored as a single document.
pub trait Record: Serialize + DeserializeOwned + Validate + Sized {
    /// Attach the document id (ids are not stored as fields).
    fn set_id(&mut self, id: String);

    /// Encode the record as a field map.
    fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self).map_err(|e| AppError::Internal(e.into()))? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::Internal(anyhow::anyhow!(
                "record encoded as non-map value: {}",
                other
            ))),
        }
    }

    /// Decode and validate a stored field map.
    fn from_document(id: &str, doc: Document) -> Result<Self> {
        let mut record: Self = serde_json::from_value(Value::Object(doc))
            .map_err(|e| AppError::Mapping(format!("{}: {}", id, e)))?;
        record
            .validate()
            .map_err(|e| AppError::Mapping(format!("{}: {}", id, e)))?;
        record.set_id(id.to_string());
        Ok(record)
    }
}

/// Encode any serializable value as a (partial) field map.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(anyhow::anyhow!(
            "fields encoded as non-map value: {}",
            other
        ))),
    }
}

/// Reject empty or whitespace-only text.
pub fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Serde adapter: `""` (or a missing/null field) on the wire is `None` in Rust.
pub mod empty_as_none {
    use serde::de::{DeserializeOwned, IntoDeserializer};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => {
                let de: serde::de::value::StringDeserializer<D::Error> = s.into_deserializer();
                T::deserialize(de).map(Some)
            }
        }
    }
}
