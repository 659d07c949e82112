//! Shared helpers for router-level tests
//!
//! Tests get a fresh database from `#[sqlx::test]`, build the full router
//! around it and drive it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edumanager_server::{api, config::Config, features::FeatureState};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("admin@escola.br", "admin-pass");
pub const READER: (&str, &str) = ("leitor@escola.br", "reader-pass");

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        "CORS_ALLOWED_ORIGINS" => Some("*".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Router over `pool` with one admin and one reader account
pub async fn test_app(pool: PgPool) -> Router {
    for (email, password, role) in [
        (ADMIN.0, ADMIN.1, "admin"),
        (READER.0, READER.1, "reader"),
    ] {
        sqlx::query("INSERT INTO users (email, password, role) VALUES ($1, $2, $3)")
            .bind(email)
            .bind(password)
            .bind(role)
            .execute(&pool)
            .await
            .unwrap();
    }

    let config = test_config();
    api::create_router(FeatureState::new(pool, &config), &config)
}

pub fn basic((email, password): (&str, &str)) -> String {
    format!("Basic {}", STANDARD.encode(format!("{email}:{password}")))
}

/// Send a request and decode the JSON body (`Value::Null` when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    account: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(account) = account {
        builder = builder.header(header::AUTHORIZATION, basic(account));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
