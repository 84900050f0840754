// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use rugby_roster::config::Config;
use rugby_roster::db::{FirestoreStore, InMemoryStore};
use rugby_roster::routes::create_router;
use rugby_roster::storage::InMemoryBlobStore;
use rugby_roster::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test store connected to the emulator.
#[allow(dead_code)]
pub async fn test_store() -> FirestoreStore {
    FirestoreStore::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Handles on the in-memory backends behind a test app.
#[allow(dead_code)]
pub struct TestBackends {
    pub store: Arc<InMemoryStore>,
    pub blobs: Arc<InMemoryBlobStore>,
}

/// Create a test app over in-memory stores.
/// Returns the router, the shared state and the backing stores.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, TestBackends) {
    let store = Arc::new(InMemoryStore::new());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let state = Arc::new(AppState::new(
        Config::test_default(),
        store.clone(),
        blobs.clone(),
    ));

    (create_router(state.clone()), state, TestBackends { store, blobs })
}

/// Build a JSON request.
#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// A complete player body in wire form.
#[allow(dead_code)]
pub fn player_body(given: &str, surname: &str) -> Value {
    serde_json::json!({
        "nombre": given,
        "apellido": surname,
        "posicionPrimaria": "Pilar",
        "posicionSecundaria": "",
        "peso": "110",
        "altura": "1.85",
        "fechaNacimiento": "14/02/1999",
        "fotoUrl": "",
        "licencia": "",
    })
}
