// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team and category routes.

use super::{upload_from_body, Identified, MAX_UPLOAD_BYTES};
use crate::error::Result;
use crate::models::{Category, Team};
use crate::services::CascadeReport;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    routing::{delete, get, put},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/teams", get(list_teams).post(create_team))
        .route("/api/teams/{team_id}", get(get_team))
        .route(
            "/api/teams/{team_id}/crest",
            put(replace_crest).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/teams/{team_id}/categories",
            get(list_categories).post(create_category),
        )
        .route("/api/teams/{team_id}/category-events", get(category_events))
        .route(
            "/api/teams/{team_id}/categories/{name}",
            delete(delete_category),
        )
        .route("/api/categories/{name}/team", get(team_for_category))
}

fn team_response(team: Team) -> Identified<Team> {
    Identified {
        id: team.id.clone(),
        record: team,
    }
}

fn category_response(category: Category) -> Identified<Category> {
    Identified {
        id: category.id.clone(),
        record: category,
    }
}

// ─── Teams ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateTeamRequest {
    #[serde(rename = "nombre")]
    name: String,
}

async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Identified<Team>>>> {
    let teams = state.teams.list().await?;
    Ok(Json(teams.into_iter().map(team_response).collect()))
}

async fn create_team(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Identified<Team>>)> {
    let team = state.teams.create(&request.name, None).await?;
    Ok((StatusCode::CREATED, Json(team_response(team))))
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
) -> Result<Json<Identified<Team>>> {
    Ok(Json(team_response(state.teams.get(&team_id).await?)))
}

async fn replace_crest(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Identified<Team>>> {
    let crest = upload_from_body(&headers, body)?;
    let team = state.teams.replace_crest(&team_id, crest).await?;
    Ok(Json(team_response(team)))
}

// ─── Categories ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateCategoryRequest {
    #[serde(rename = "nombre")]
    name: String,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<Identified<Category>>>> {
    let categories = state.categories.list(&team_id).await?;
    Ok(Json(categories.into_iter().map(category_response).collect()))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Identified<Category>>)> {
    let category = state.categories.create(&team_id, &request.name).await?;
    Ok((StatusCode::CREATED, Json(category_response(category))))
}

/// Delete a category and all of its players.
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path((team_id, name)): Path<(String, String)>,
) -> Result<Json<CascadeReport>> {
    tracing::info!(team_id = %team_id, category = %name, "Category deletion requested");
    Ok(Json(state.categories.delete(&team_id, &name).await?))
}

/// Server-sent events with the team's category names after every change.
async fn category_events(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let updates = state.teams.watch_categories(&team_id).await?;

    let events = updates.map(|update| {
        let event = match update {
            Ok(names) => Event::default()
                .event("categories")
                .json_data(&names)
                .unwrap_or_else(|e| Event::default().event("error").data(e.to_string())),
            Err(e) => Event::default().event("error").data(e.to_string()),
        };
        Ok(event)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn team_for_category(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Identified<Team>>> {
    let team = state.categories.find_team_for_category(&name).await?;
    Ok(Json(team_response(team)))
}
