// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance bookkeeping.
//!
//! One sheet per (team, date, category). Recording checks whether the sheet
//! exists, then updates or creates it; two concurrent recorders for the same
//! sheet race between the check and the write, last write wins.

use crate::db::{collections, CollectionRef, DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{AttendanceEntry, AttendanceRecord, Record};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

fn sheets() -> CollectionRef {
    CollectionRef::root(collections::ATTENDANCE)
}

/// Document id of the sheet for a (team, date, category).
pub fn attendance_key(team_id: &str, date: NaiveDate, category: &str) -> String {
    format!(
        "{}_{}_{}",
        team_id,
        date.format("%Y-%m-%d"),
        urlencoding::encode(category)
    )
}

/// Whether `record` created a sheet or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Attendance sheets over the document store.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn DocumentStore>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store the sheet for a day, replacing any previous one.
    ///
    /// `marks` maps a player's full name to present/absent/unset.
    pub async fn record(
        &self,
        team_id: &str,
        category: &str,
        date: NaiveDate,
        marks: BTreeMap<String, Option<bool>>,
    ) -> Result<UpsertOutcome> {
        if let Some(blank) = marks.keys().find(|name| name.trim().is_empty()) {
            return Err(AppError::BadRequest(format!(
                "attendance entry with blank name {:?}",
                blank
            )));
        }

        let record = AttendanceRecord {
            id: attendance_key(team_id, date, category),
            date,
            category: category.to_string(),
            team_id: team_id.to_string(),
            entries: marks
                .into_iter()
                .map(|(full_name, present)| AttendanceEntry { full_name, present })
                .collect(),
        };
        record.validate()?;
        let doc = record.to_document()?;

        let outcome = if self.store.get(&sheets(), &record.id).await?.is_some() {
            self.store.update(&sheets(), &record.id, doc).await?;
            UpsertOutcome::Updated
        } else {
            self.store.set(&sheets(), &record.id, doc).await?;
            UpsertOutcome::Created
        };

        tracing::info!(
            team_id,
            category,
            date = %date,
            entries = record.entries.len(),
            present = record.present_count(),
            ?outcome,
            "Attendance recorded"
        );
        Ok(outcome)
    }

    /// The sheet for one day, if any.
    pub async fn get(
        &self,
        team_id: &str,
        category: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>> {
        let id = attendance_key(team_id, date, category);
        self.store
            .get(&sheets(), &id)
            .await?
            .map(|doc| AttendanceRecord::from_document(&id, doc))
            .transpose()
    }

    /// All sheets of a category, newest first.
    ///
    /// A sheet with an unparseable date fails the whole load.
    pub async fn history(&self, team_id: &str, category: &str) -> Result<Vec<AttendanceRecord>> {
        let mut records = self
            .store
            .get_all(
                &sheets(),
                &[
                    Filter::Eq("equipoId", team_id.to_string()),
                    Filter::Eq("categoria", category.to_string()),
                ],
            )
            .await?
            .into_iter()
            .map(|(id, doc)| AttendanceRecord::from_document(&id, doc))
            .collect::<Result<Vec<_>>>()?;

        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn marks(entries: &[(&str, Option<bool>)]) -> BTreeMap<String, Option<bool>> {
        entries
            .iter()
            .map(|(name, present)| (name.to_string(), *present))
            .collect()
    }

    #[test]
    fn test_attendance_key() {
        assert_eq!(
            attendance_key("los-pumas", date(2024, 3, 5), "Primera División"),
            "los-pumas_2024-03-05_Primera%20Divisi%C3%B3n"
        );
    }

    #[tokio::test]
    async fn test_second_record_overwrites_first() {
        let store = Arc::new(InMemoryStore::new());
        let svc = AttendanceService::new(store.clone());
        let day = date(2024, 1, 10);

        let first = svc
            .record(
                "los-pumas",
                "Senior",
                day,
                marks(&[("Luis Pérez", Some(true)), ("Ana Gómez", Some(false))]),
            )
            .await
            .unwrap();
        let second = svc
            .record("los-pumas", "Senior", day, marks(&[("Juan Soto", None)]))
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(store.count(&sheets()), 1);

        let stored = svc.get("los-pumas", "Senior", day).await.unwrap().unwrap();
        assert_eq!(
            stored.entries,
            vec![AttendanceEntry {
                full_name: "Juan Soto".to_string(),
                present: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let svc = AttendanceService::new(Arc::new(InMemoryStore::new()));
        for day in [date(2024, 1, 10), date(2024, 3, 5), date(2023, 12, 31)] {
            svc.record("los-pumas", "Senior", day, marks(&[("Luis Pérez", Some(true))]))
                .await
                .unwrap();
        }
        svc.record("los-pumas", "M19", date(2024, 6, 1), marks(&[]))
            .await
            .unwrap();

        let history = svc.history("los-pumas", "Senior").await.unwrap();
        let dates: Vec<_> = history.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 3, 5), date(2024, 1, 10), date(2023, 12, 31)]
        );
    }

    #[tokio::test]
    async fn test_bad_date_fails_history() {
        let store = Arc::new(InMemoryStore::new());
        let svc = AttendanceService::new(store.clone());
        svc.record("los-pumas", "Senior", date(2024, 1, 10), marks(&[]))
            .await
            .unwrap();
        let corrupt = json!({"fecha": "10-01-2024", "categoria": "Senior", "equipoId": "los-pumas"})
            .as_object()
            .cloned()
            .unwrap();
        store.set(&sheets(), "corrupt", corrupt).await.unwrap();

        let err = svc.history("los-pumas", "Senior").await.unwrap_err();
        assert!(matches!(err, AppError::Mapping(_)));
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let svc = AttendanceService::new(Arc::new(InMemoryStore::new()));
        let err = svc
            .record("los-pumas", "Senior", date(2024, 1, 10), marks(&[(" ", Some(true))]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
