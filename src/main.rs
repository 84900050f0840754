// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rugby Roster API Server
//!
//! Serves team, category, player and attendance records for the coaching
//! app, backed by Firestore and Cloud Storage.

use rugby_roster::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreStore, InMemoryStore},
    storage::{BlobStore, GcsBlobStore, InMemoryBlobStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Rugby Roster API"
    );

    let (store, blobs): (Arc<dyn DocumentStore>, Arc<dyn BlobStore>) = match config.store_backend
    {
        StoreBackend::Firestore => (
            Arc::new(FirestoreStore::new(&config.gcp_project_id).await?),
            Arc::new(GcsBlobStore::new(&config.storage_bucket).await?),
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            (
                Arc::new(InMemoryStore::new()),
                Arc::new(InMemoryBlobStore::new()),
            )
        }
    };
    tracing::info!(
        documents = store.backend_tag(),
        blobs = blobs.backend_tag(),
        "Stores initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, blobs));

    // Build router
    let app = rugby_roster::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rugby_roster=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
