// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Team records and their crests.

use crate::db::{collections, CollectionRef, DocumentStore};
use crate::error::{AppError, Result};
use crate::models::{Record, Team};
use crate::services::ids;
use crate::services::saga::Saga;
use crate::storage::{image_extension, BlobStore, Upload};
use futures_util::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use validator::Validate;

/// Team CRUD over the document store.
#[derive(Clone)]
pub struct TeamService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

pub(crate) fn teams() -> CollectionRef {
    CollectionRef::root(collections::TEAMS)
}

impl TeamService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Create a team keyed by the slug of its name.
    pub async fn create(&self, name: &str, crest: Option<Upload>) -> Result<Team> {
        let mut team = Team {
            id: ids::slug(name),
            name: name.trim().to_string(),
            crest_url: None,
            categories: Vec::new(),
        };
        team.validate()?;
        if team.id.is_empty() {
            return Err(AppError::BadRequest(format!(
                "team name {:?} has no usable characters",
                name
            )));
        }

        if self.store.get(&teams(), &team.id).await?.is_some() {
            return Err(AppError::Conflict(format!("team {} already exists", team.id)));
        }

        let mut saga = Saga::new("create_team");
        if let Some(crest) = crest {
            let url = self.upload_crest(&team.id, crest).await?;
            let blobs = self.blobs.clone();
            let orphan = url.clone();
            saga.on_failure("delete uploaded crest", async move {
                blobs.delete(&orphan).await.map_err(AppError::from)
            });
            team.crest_url = Some(url);
        }

        let doc = team.to_document()?;
        if let Err(e) = self.store.set(&teams(), &team.id, doc).await {
            return Err(saga.abort(e.into()).await);
        }
        saga.complete();

        tracing::info!(team_id = %team.id, "Team created");
        Ok(team)
    }

    /// Fetch one team.
    pub async fn get(&self, team_id: &str) -> Result<Team> {
        let doc = self
            .store
            .get(&teams(), team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team {}", team_id)))?;
        Team::from_document(team_id, doc)
    }

    /// All teams, sorted by display name.
    pub async fn list(&self) -> Result<Vec<Team>> {
        let mut teams = self
            .store
            .get_all(&teams(), &[])
            .await?
            .into_iter()
            .map(|(id, doc)| Team::from_document(&id, doc))
            .collect::<Result<Vec<_>>>()?;
        teams.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(teams)
    }

    /// Upload a new crest, point the team at it, then drop the old one.
    pub async fn replace_crest(&self, team_id: &str, crest: Upload) -> Result<Team> {
        let mut team = self.get(team_id).await?;
        let previous = team.crest_url.take();

        let url = self.upload_crest(team_id, crest).await?;
        let mut saga = Saga::new("replace_crest");
        let blobs = self.blobs.clone();
        let orphan = url.clone();
        saga.on_failure("delete uploaded crest", async move {
            blobs.delete(&orphan).await.map_err(AppError::from)
        });

        let mut partial = crate::db::Document::new();
        partial.insert("escudoUrl".to_string(), url.clone().into());
        if let Err(e) = self.store.update(&teams(), team_id, partial).await {
            return Err(saga.abort(e.into()).await);
        }
        saga.complete();
        team.crest_url = Some(url);

        if let Some(old) = previous {
            // The team already points at the new crest; a leftover blob is harmless.
            if let Err(e) = self.blobs.delete(&old).await {
                tracing::warn!(team_id, url = %old, error = %e, "Failed to delete previous crest");
            }
        }

        tracing::info!(team_id, "Team crest replaced");
        Ok(team)
    }

    /// Live view of a team's category names, one item per change.
    pub async fn watch_categories(
        &self,
        team_id: &str,
    ) -> Result<BoxStream<'static, Result<Vec<String>>>> {
        let team_id = team_id.to_string();
        let updates = self.store.watch(&teams(), &team_id).await?;

        Ok(updates
            .map(move |state| match state {
                Ok(Some(doc)) => Team::from_document(&team_id, doc).map(|team| team.categories),
                Ok(None) => Err(AppError::NotFound(format!("team {}", team_id))),
                Err(e) => Err(e.into()),
            })
            .boxed())
    }

    async fn upload_crest(&self, team_id: &str, crest: Upload) -> Result<String> {
        let ext = image_extension(&crest.content_type).ok_or_else(|| {
            AppError::BadRequest(format!("unsupported image type {}", crest.content_type))
        })?;
        let path = format!("escudos/{}/{}.{}", team_id, ids::random_id()?, ext);
        Ok(self
            .blobs
            .put(&path, crest.bytes, &crest.content_type)
            .await?)
    }
}
