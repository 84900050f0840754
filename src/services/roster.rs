// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player roster service.
//!
//! Players belong to one category of one team. Photos live in the blob
//! store; a player's blob is removed whenever the photo is replaced or the
//! player is deleted.

use crate::db::{collections, CollectionRef, DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::fields::to_fields;
use crate::models::{Player, PlayerFields, Record, Team};
use crate::services::ids;
use crate::services::saga::Saga;
use crate::services::team::teams;
use crate::storage::{image_extension, BlobError, BlobStore, Upload};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

pub(crate) fn players() -> CollectionRef {
    CollectionRef::root(collections::PLAYERS)
}

/// Outcome of deleting every player of a category.
///
/// Individual failures do not stop the loop; failed players stay in the
/// store and can be retried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Number of players removed.
    pub deleted: u32,
    /// Player ids that could not be removed.
    pub failed_ids: Vec<String>,
}

impl CascadeReport {
    /// Returns true if every player was removed.
    pub fn is_complete_success(&self) -> bool {
        self.failed_ids.is_empty()
    }
}

/// Player CRUD over the document and blob stores.
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl RosterService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Create a player in a category of a team.
    pub async fn create(&self, team_id: &str, category: &str, fields: PlayerFields) -> Result<Player> {
        fields.validate()?;
        self.require_category(team_id, category).await?;

        let player = Player {
            id: ids::player_id(&fields.given_name, &fields.surname)?,
            fields,
            category: category.to_string(),
            team_id: team_id.to_string(),
        };

        self.store
            .set(&players(), &player.id, player.to_document()?)
            .await?;

        tracing::info!(player_id = %player.id, team_id, category, "Player created");
        Ok(player)
    }

    /// Upload a photo for a player, returning its URL.
    ///
    /// The URL is not attached to the player until `create` or `update`.
    pub async fn upload_photo(&self, player_id: &str, photo: Upload) -> Result<String> {
        let ext = image_extension(&photo.content_type).ok_or_else(|| {
            AppError::BadRequest(format!("unsupported image type {}", photo.content_type))
        })?;
        let path = format!("jugadores/{}/{}.{}", player_id, ids::random_id()?, ext);
        let url = self
            .blobs
            .put(&path, photo.bytes, &photo.content_type)
            .await?;
        tracing::debug!(player_id, url = %url, "Player photo uploaded");
        Ok(url)
    }

    pub async fn get(&self, player_id: &str) -> Result<Player> {
        let doc = self
            .store
            .get(&players(), player_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("player {}", player_id)))?;
        Player::from_document(player_id, doc)
    }

    /// Players of a category, in store order.
    pub async fn list(&self, team_id: &str, category: &str) -> Result<Vec<Player>> {
        self.store
            .get_all(
                &players(),
                &[
                    Filter::Eq("equipoId", team_id.to_string()),
                    Filter::Eq("categoria", category.to_string()),
                ],
            )
            .await?
            .into_iter()
            .map(|(id, doc)| Player::from_document(&id, doc))
            .collect()
    }

    /// Overwrite a player's editable fields.
    ///
    /// When the photo changed, the previous blob is deleted only after the
    /// document write succeeded; if the write fails, the new blob is.
    pub async fn update(
        &self,
        player_id: &str,
        fields: PlayerFields,
        previous_photo_url: Option<&str>,
    ) -> Result<Player> {
        fields.validate()?;

        let new_photo = fields.photo_url.clone();
        let photo_changed = new_photo.as_deref() != previous_photo_url;
        let partial = to_fields(&fields)?;

        let mut saga = Saga::new("update_player");
        if let (true, Some(url)) = (photo_changed, new_photo) {
            let blobs = self.blobs.clone();
            saga.on_failure("delete uploaded photo", async move {
                blobs.delete(&url).await.map_err(AppError::from)
            });
        }
        if let Err(e) = self.store.update(&players(), player_id, partial).await {
            return Err(saga.abort(e.into()).await);
        }
        saga.complete();

        if let (true, Some(old)) = (photo_changed, previous_photo_url) {
            // Best effort: the player no longer references the old blob.
            if let Err(e) = self.blobs.delete(old).await {
                tracing::warn!(player_id, url = old, error = %e, "Failed to delete previous photo");
            }
        }

        tracing::info!(player_id, photo_changed, "Player updated");
        self.get(player_id).await
    }

    /// Delete a player's photo, then the player.
    pub async fn delete(&self, player_id: &str) -> Result<()> {
        let player = self.get(player_id).await?;
        self.delete_player(&player).await?;
        tracing::info!(player_id, "Player deleted");
        Ok(())
    }

    /// Delete every player of a category, photos first.
    pub async fn delete_by_category(&self, team_id: &str, category: &str) -> Result<CascadeReport> {
        let players = self.list(team_id, category).await?;
        let mut report = CascadeReport::default();

        for player in &players {
            match self.delete_player(player).await {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::warn!(player_id = %player.id, error = %e, "Failed to delete player");
                    report.failed_ids.push(player.id.clone());
                }
            }
        }

        tracing::info!(
            team_id,
            category,
            deleted = report.deleted,
            failed = report.failed_ids.len(),
            "Category players deleted"
        );
        Ok(report)
    }

    async fn delete_player(&self, player: &Player) -> Result<()> {
        if let Some(url) = &player.fields.photo_url {
            match self.blobs.delete(url).await {
                Ok(()) => {}
                // Not one of our blobs (legacy or external URL); nothing to remove.
                Err(BlobError::InvalidUrl(_)) => {
                    tracing::warn!(player_id = %player.id, url = %url, "Photo URL not owned by blob store, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.store.delete(&players(), &player.id).await?;
        Ok(())
    }

    /// Fail unless the team exists and lists the category.
    async fn require_category(&self, team_id: &str, category: &str) -> Result<()> {
        let doc = self
            .store
            .get(&teams(), team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team {}", team_id)))?;
        let team = Team::from_document(team_id, doc)?;
        if !team.categories.iter().any(|c| c == category) {
            return Err(AppError::NotFound(format!(
                "category {} in team {}",
                category, team_id
            )));
        }
        Ok(())
    }
}
