// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance routes.
//!
//! The request body carries the day in the stored `dd/MM/yyyy` form; the
//! single-day lookup takes an ISO date in the path.

use super::Identified;
use crate::error::{AppError, Result};
use crate::models::AttendanceRecord;
use crate::services::UpsertOutcome;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/teams/{team_id}/categories/{name}/attendance",
            get(history).post(record),
        )
        .route(
            "/api/teams/{team_id}/categories/{name}/attendance/{date}",
            get(get_day),
        )
}

#[derive(Deserialize)]
struct RecordRequest {
    #[serde(rename = "fecha", with = "crate::time_utils::stored_date")]
    date: NaiveDate,
    #[serde(rename = "asistencias", default)]
    marks: BTreeMap<String, Option<bool>>,
}

#[derive(Serialize)]
struct RecordResponse {
    id: String,
    outcome: UpsertOutcome,
}

fn sheet_response(record: AttendanceRecord) -> Identified<AttendanceRecord> {
    Identified {
        id: record.id.clone(),
        record,
    }
}

async fn record(
    State(state): State<Arc<AppState>>,
    Path((team_id, category)): Path<(String, String)>,
    Json(request): Json<RecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>)> {
    let outcome = state
        .attendance
        .record(&team_id, &category, request.date, request.marks)
        .await?;
    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    Ok((
        status,
        Json(RecordResponse {
            id: crate::services::attendance::attendance_key(&team_id, request.date, &category),
            outcome,
        }),
    ))
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path((team_id, category)): Path<(String, String)>,
) -> Result<Json<Vec<Identified<AttendanceRecord>>>> {
    let records = state.attendance.history(&team_id, &category).await?;
    Ok(Json(records.into_iter().map(sheet_response).collect()))
}

async fn get_day(
    State(state): State<Arc<AppState>>,
    Path((team_id, category, date)): Path<(String, String, String)>,
) -> Result<Json<Identified<AttendanceRecord>>> {
    let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("invalid date {:?}, expected YYYY-MM-DD", date)))?;
    let record = state
        .attendance
        .get(&team_id, &category, day)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("attendance for {} on {}", category, day)))?;
    Ok(Json(sheet_response(record)))
}
