// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player model.

use super::fields::{empty_as_none, not_blank, Record};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Playing position. The wire spelling is fixed by existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Pilar")]
    Prop,
    #[serde(rename = "Hooker")]
    Hooker,
    #[serde(rename = "Segunda Línea")]
    Lock,
    #[serde(rename = "Ala")]
    Flanker,
    #[serde(rename = "Octavo")]
    NumberEight,
    #[serde(rename = "Medio Scrum")]
    ScrumHalf,
    #[serde(rename = "Apertura")]
    FlyHalf,
    #[serde(rename = "Centro")]
    Centre,
    #[serde(rename = "Wing")]
    Wing,
    #[serde(rename = "Fullback")]
    Fullback,
}

/// Editable player fields, as sent by the coach.
///
/// Serializes to the same keys as [`Player`], so it doubles as the partial
/// document for in-place edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlayerFields {
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "posicionPrimaria")]
    pub primary_position: Position,
    #[serde(rename = "posicionSecundaria", default, with = "empty_as_none")]
    pub secondary_position: Option<Position>,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "peso")]
    pub weight: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "altura")]
    pub height: String,
    /// Free text, not a validated date.
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "fechaNacimiento")]
    pub birth_date: String,
    #[serde(rename = "fotoUrl", default, with = "empty_as_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "licencia", default, with = "empty_as_none")]
    pub license: Option<String>,
}

/// Player document.
///
/// Stored at: `jugadores/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Player {
    #[serde(skip)]
    pub id: String,
    #[validate(nested)]
    #[serde(flatten)]
    pub fields: PlayerFields,
    /// Owning category name
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "categoria")]
    pub category: String,
    /// Owning team id
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "equipoId")]
    pub team_id: String,
}

impl Player {
    /// Full name as used in attendance sheets.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.fields.given_name.trim(), self.fields.surname.trim())
    }
}

impl Record for Player {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_doc() -> crate::db::Document {
        json!({
            "nombre": "Luis",
            "apellido": "Pérez",
            "posicionPrimaria": "Segunda Línea",
            "posicionSecundaria": "",
            "peso": "102",
            "altura": "1.95",
            "fechaNacimiento": "12/04/2001",
            "fotoUrl": "",
            "categoria": "Senior",
            "equipoId": "los-pumas",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_decode_stored_player() {
        let player = Player::from_document("luis-perez-0a1b2c3d", legacy_doc()).unwrap();
        assert_eq!(player.id, "luis-perez-0a1b2c3d");
        assert_eq!(player.fields.primary_position, Position::Lock);
        assert_eq!(player.fields.secondary_position, None);
        assert_eq!(player.fields.photo_url, None);
        assert_eq!(player.fields.license, None);
        assert_eq!(player.full_name(), "Luis Pérez");
    }

    #[test]
    fn test_encode_uses_flat_wire_keys() {
        let player = Player::from_document("p1", legacy_doc()).unwrap();
        let fields = player.to_document().unwrap();
        assert_eq!(fields["posicionPrimaria"], "Segunda Línea");
        assert_eq!(fields["posicionSecundaria"], "");
        assert_eq!(fields["licencia"], "");
        assert_eq!(fields["categoria"], "Senior");
        assert!(!fields.contains_key("fields"));
    }

    #[test]
    fn test_unknown_position_is_rejected() {
        let mut doc = legacy_doc();
        doc.insert("posicionPrimaria".to_string(), json!("Portero"));
        assert!(Player::from_document("p1", doc).is_err());
    }

    #[test]
    fn test_blank_surname_fails_validation() {
        let mut doc = legacy_doc();
        doc.insert("apellido".to_string(), json!(" "));
        assert!(Player::from_document("p1", doc).is_err());
    }
}
