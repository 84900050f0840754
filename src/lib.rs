// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rugby Roster: team, category, player and attendance records for coaches.
//!
//! This crate provides the backend API over a remote document store
//! (Firestore) and blob store (Cloud Storage) used by the coaching app.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{AttendanceService, CategoryService, RosterService, TeamService};
use std::sync::Arc;
use storage::BlobStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub teams: TeamService,
    pub categories: CategoryService,
    pub roster: RosterService,
    pub attendance: AttendanceService,
}

impl AppState {
    /// Wire every service to the same store handles.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let roster = RosterService::new(store.clone(), blobs.clone());
        Self {
            config,
            teams: TeamService::new(store.clone(), blobs),
            categories: CategoryService::new(store.clone(), roster.clone()),
            roster,
            attendance: AttendanceService::new(store),
        }
    }
}
