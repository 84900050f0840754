// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Category service.
//!
//! A category exists twice: as a document in the team's `categorias`
//! sub-collection and as a name in the team document's `categorias` list.
//! Both are written here, in an order that keeps a failure retryable:
//!
//! - create: category document, then list entry (document removed if the
//!   list update fails).
//! - delete: players, then list entry, then category document. A failure
//!   while deleting players leaves the category listed so the coach can
//!   retry; a failure after the list update leaves an unlisted document,
//!   which `list` does not show.

use crate::db::{collections, CollectionRef, DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{Category, Record, Team};
use crate::services::ids;
use crate::services::roster::{CascadeReport, RosterService};
use crate::services::saga::Saga;
use crate::services::team::teams;
use std::sync::Arc;
use validator::Validate;

const TEAM_CATEGORIES_FIELD: &str = "categorias";

fn categories_of(team_id: &str) -> CollectionRef {
    CollectionRef::nested(collections::TEAMS, team_id, collections::CATEGORIES)
}

/// Category CRUD scoped to a team.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn DocumentStore>,
    roster: RosterService,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DocumentStore>, roster: RosterService) -> Self {
        Self { store, roster }
    }

    /// Register a category under a team.
    ///
    /// Names are unique within a team; other teams may reuse them.
    pub async fn create(&self, team_id: &str, name: &str) -> Result<Category> {
        let category = Category {
            id: ids::random_id()?,
            name: name.trim().to_string(),
            team_id: team_id.to_string(),
        };
        category.validate()?;

        let team = self.team(team_id).await?;
        if team.categories.iter().any(|c| c == &category.name) {
            return Err(AppError::Conflict(format!(
                "category {} already exists in team {}",
                category.name, team_id
            )));
        }

        let collection = categories_of(team_id);
        self.store
            .set(&collection, &category.id, category.to_document()?)
            .await?;

        let mut saga = Saga::new("create_category");
        let store = self.store.clone();
        let written_id = category.id.clone();
        saga.on_failure("delete category document", async move {
            store
                .delete(&collection, &written_id)
                .await
                .map_err(AppError::from)
        });

        if let Err(e) = self
            .store
            .array_union(
                &teams(),
                team_id,
                TEAM_CATEGORIES_FIELD,
                vec![category.name.clone()],
            )
            .await
        {
            return Err(saga.abort(e.into()).await);
        }
        saga.complete();

        tracing::info!(team_id, category = %category.name, "Category created");
        Ok(category)
    }

    /// Categories listed on the team, sorted by name.
    pub async fn list(&self, team_id: &str) -> Result<Vec<Category>> {
        let team = self.team(team_id).await?;
        let mut categories = self
            .store
            .get_all(&categories_of(team_id), &[])
            .await?
            .into_iter()
            .map(|(id, doc)| Category::from_document(&id, doc))
            .collect::<Result<Vec<_>>>()?;

        categories.retain(|c| team.categories.contains(&c.name));
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories.dedup_by(|a, b| a.name == b.name);
        Ok(categories)
    }

    /// Delete a category together with its players.
    pub async fn delete(&self, team_id: &str, name: &str) -> Result<CascadeReport> {
        let name = name.trim();
        let team = self.team(team_id).await?;
        let collection = categories_of(team_id);
        let documents = self
            .store
            .get_all(&collection, &[Filter::Eq("nombre", name.to_string())])
            .await?;

        if documents.is_empty() && !team.categories.iter().any(|c| c == name) {
            return Err(AppError::NotFound(format!(
                "category {} in team {}",
                name, team_id
            )));
        }

        let report = self.roster.delete_by_category(team_id, name).await?;
        if !report.is_complete_success() {
            return Err(AppError::PartialFailure(format!(
                "{} players of {} could not be deleted; category kept",
                report.failed_ids.len(),
                name
            )));
        }

        self.store
            .array_remove(&teams(), team_id, TEAM_CATEGORIES_FIELD, vec![name.to_string()])
            .await?;

        for (id, _) in documents {
            self.store.delete(&collection, &id).await?;
        }

        tracing::info!(team_id, category = name, players = report.deleted, "Category deleted");
        Ok(report)
    }

    /// Find the team that lists a category name.
    ///
    /// Fails with `Conflict` when several teams use the name.
    pub async fn find_team_for_category(&self, name: &str) -> Result<Team> {
        let name = name.trim();
        let mut matches = self
            .store
            .get_all(
                &teams(),
                &[Filter::ArrayContains(TEAM_CATEGORIES_FIELD, name.to_string())],
            )
            .await?;

        match matches.len() {
            0 => Err(AppError::NotFound(format!("no team has category {}", name))),
            1 => {
                let (id, doc) = matches.remove(0);
                Team::from_document(&id, doc)
            }
            n => Err(AppError::Conflict(format!(
                "category {} is used by {} teams",
                name, n
            ))),
        }
    }

    async fn team(&self, team_id: &str) -> Result<Team> {
        let doc = self
            .store
            .get(&teams(), team_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team {}", team_id)))?;
        Team::from_document(team_id, doc)
    }
}
