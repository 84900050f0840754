// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance sheet model.

use super::fields::{not_blank, Record};
use crate::time_utils::stored_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of an attendance sheet.
///
/// Players are referenced by full name, not id: renaming a player leaves
/// older sheets pointing at the old name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    #[serde(rename = "nombre")]
    pub full_name: String,
    /// `None` when the coach has not marked the player yet.
    #[serde(rename = "presente", default)]
    pub present: Option<bool>,
}

/// Attendance sheet for one category on one day.
///
/// Stored at: `asistencias/{team_id}_{YYYY-MM-DD}_{category}`; at most one
/// document per (team, date, category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AttendanceRecord {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "fecha", with = "stored_date")]
    pub date: NaiveDate,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "categoria")]
    pub category: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "equipoId")]
    pub team_id: String,
    #[serde(rename = "asistencias", default)]
    pub entries: Vec<AttendanceEntry>,
}

impl AttendanceRecord {
    /// Number of players marked present.
    pub fn present_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.present == Some(true))
            .count()
    }
}

impl Record for AttendanceRecord {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
