// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use rugby_roster::db::StoreError;
use rugby_roster::error::AppError;
use rugby_roster::storage::BlobError;
use validator::{ValidationError, ValidationErrors};

#[test]
fn test_error_status_codes() {
    let cases = [
        (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("x".into()), StatusCode::CONFLICT),
        (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (AppError::Storage("x".into()), StatusCode::BAD_GATEWAY),
        (
            AppError::PartialFailure("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (AppError::Mapping("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        let label = err.to_string();
        assert_eq!(err.into_response().status(), expected, "{}", label);
    }
}

#[test]
fn test_store_errors_convert() {
    let err: AppError = StoreError::NotFound("jugadores/luis".into()).into();
    assert!(matches!(err, AppError::NotFound(_)));

    let err: AppError = StoreError::Backend("unavailable".into()).into();
    assert!(matches!(err, AppError::Database(_)));

    let err: AppError = BlobError::InvalidUrl("ftp://x".into()).into();
    assert!(matches!(err, AppError::Storage(_)));
}

#[tokio::test]
async fn test_backend_details_are_not_exposed() {
    let response = AppError::Database("secret connection string".into()).into_response();
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(body.contains("database_error"));
    assert!(!body.contains("secret"));
}

#[test]
fn test_validation_errors_list_sorted_fields() {
    let mut errors = ValidationErrors::new();
    errors.add("peso", ValidationError::new("blank"));
    errors.add("apellido", ValidationError::new("blank"));

    let err: AppError = errors.into();
    assert!(
        matches!(&err, AppError::BadRequest(msg) if msg == "invalid fields: apellido, peso"),
        "{}",
        err
    );
}

