// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for attendance date formatting.

use chrono::NaiveDate;

/// Date format stored in the `fecha` field of attendance records.
pub const STORED_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date the way attendance records store it (`dd/MM/yyyy`).
pub fn format_stored_date(date: NaiveDate) -> String {
    date.format(STORED_DATE_FORMAT).to_string()
}

/// Parse a stored `dd/MM/yyyy` date.
pub fn parse_stored_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), STORED_DATE_FORMAT)
}

/// Serde adapter for [`NaiveDate`] fields stored as `dd/MM/yyyy`.
pub mod stored_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_stored_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_stored_date(&raw)
            .map_err(|e| serde::de::Error::custom(format!("invalid date {:?}: {}", raw, e)))
    }
}
