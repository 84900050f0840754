// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance sheet API tests.

use axum::http::StatusCode;
use rugby_roster::db::{collections, CollectionRef};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, empty_request, json_request};

const SHEETS: &str = "/api/teams/los-pumas/categories/Senior/attendance";

async fn record(app: &axum::Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(json_request("POST", SHEETS, body))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_same_day_twice_keeps_one_sheet() {
    let (app, _, backends) = create_test_app();

    let (status, first) = record(
        &app,
        json!({
            "fecha": "10/01/2024",
            "asistencias": {"Luis Pérez": true, "Ana Gómez": false},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["outcome"], "created");
    assert_eq!(first["id"], "los-pumas_2024-01-10_Senior");

    let (status, second) = record(
        &app,
        json!({
            "fecha": "10/01/2024",
            "asistencias": {"Juan Soto": null},
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["outcome"], "updated");

    assert_eq!(
        backends
            .store
            .count(&CollectionRef::root(collections::ATTENDANCE)),
        1
    );

    let response = app
        .oneshot(empty_request("GET", &format!("{}/2024-01-10", SHEETS)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await;
    assert_eq!(sheet["fecha"], "10/01/2024");
    assert_eq!(
        sheet["asistencias"],
        json!([{"nombre": "Juan Soto", "presente": null}])
    );

    println!("✓ Second save overwrote the first");
}

#[tokio::test]
async fn test_history_newest_first() {
    let (app, _, _) = create_test_app();
    for day in ["10/01/2024", "05/03/2024", "31/12/2023"] {
        let (status, _) = record(
            &app,
            json!({"fecha": day, "asistencias": {"Luis Pérez": true}}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app.oneshot(empty_request("GET", SHEETS)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let dates: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["fecha"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["05/03/2024", "10/01/2024", "31/12/2023"]);
}

#[tokio::test]
async fn test_bad_request_date_is_rejected() {
    let (app, _, _) = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            SHEETS,
            json!({"fecha": "2024-01-10", "asistencias": {}}),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_missing_day_is_not_found() {
    let (app, _, _) = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("{}/2024-01-10", SHEETS)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(empty_request("GET", &format!("{}/10-01-2024", SHEETS)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrupt_stored_date_fails_history() {
    let (app, _, backends) = create_test_app();
    record(&app, json!({"fecha": "10/01/2024", "asistencias": {}})).await;

    use rugby_roster::db::DocumentStore;
    let corrupt = json!({"fecha": "enero", "categoria": "Senior", "equipoId": "los-pumas"})
        .as_object()
        .cloned()
        .unwrap();
    backends
        .store
        .set(&CollectionRef::root(collections::ATTENDANCE), "corrupt", corrupt)
        .await
        .unwrap();

    let response = app.oneshot(empty_request("GET", SHEETS)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "mapping_error");
}
