// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player routes.

use super::{upload_from_body, Identified, MAX_UPLOAD_BYTES};
use crate::error::Result;
use crate::models::{Player, PlayerFields};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/teams/{team_id}/categories/{name}/players",
            get(list_players).post(create_player),
        )
        .route(
            "/api/players/{player_id}",
            get(get_player).put(update_player).delete(delete_player),
        )
        .route(
            "/api/players/{player_id}/photo",
            put(replace_photo).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

fn player_response(player: Player) -> Identified<Player> {
    Identified {
        id: player.id.clone(),
        record: player,
    }
}

async fn list_players(
    State(state): State<Arc<AppState>>,
    Path((team_id, category)): Path<(String, String)>,
) -> Result<Json<Vec<Identified<Player>>>> {
    let players = state.roster.list(&team_id, &category).await?;
    Ok(Json(players.into_iter().map(player_response).collect()))
}

async fn create_player(
    State(state): State<Arc<AppState>>,
    Path((team_id, category)): Path<(String, String)>,
    Json(fields): Json<PlayerFields>,
) -> Result<(StatusCode, Json<Identified<Player>>)> {
    let player = state.roster.create(&team_id, &category, fields).await?;
    Ok((StatusCode::CREATED, Json(player_response(player))))
}

async fn get_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<Identified<Player>>> {
    Ok(Json(player_response(state.roster.get(&player_id).await?)))
}

/// Overwrite a player's fields; a changed `fotoUrl` drops the old photo.
async fn update_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    Json(fields): Json<PlayerFields>,
) -> Result<Json<Identified<Player>>> {
    let current = state.roster.get(&player_id).await?;
    let player = state
        .roster
        .update(&player_id, fields, current.fields.photo_url.as_deref())
        .await?;
    Ok(Json(player_response(player)))
}

/// Upload a new photo and attach it, replacing the previous one.
async fn replace_photo(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Identified<Player>>> {
    let photo = upload_from_body(&headers, body)?;
    let current = state.roster.get(&player_id).await?;
    let previous = current.fields.photo_url.clone();

    let url = state.roster.upload_photo(&player_id, photo).await?;
    let mut fields = current.fields;
    fields.photo_url = Some(url);

    let player = state
        .roster
        .update(&player_id, fields, previous.as_deref())
        .await?;
    Ok(Json(player_response(player)))
}

async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<StatusCode> {
    state.roster.delete(&player_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
