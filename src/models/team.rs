// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team and category models.

use super::fields::{empty_as_none, not_blank, Record};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Team document.
///
/// Stored at: `equipos/{id}`, where the id is derived from the name.
/// `categories` mirrors the names in the `categorias` sub-collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Team {
    #[serde(skip)]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "escudoUrl", default, with = "empty_as_none")]
    pub crest_url: Option<String>,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
}

impl Record for Team {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Category document.
///
/// Stored at: `equipos/{team_id}/categorias/{id}` with a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Category {
    #[serde(skip)]
    pub id: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "nombre")]
    pub name: String,
    /// Owning team id
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "equipoId")]
    pub team_id: String,
}

impl Record for Category {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
