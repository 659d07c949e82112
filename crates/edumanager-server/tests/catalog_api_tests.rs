//! Teacher and block endpoints

use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;

mod common;
use common::{send, test_app, ADMIN, READER};

#[sqlx::test(migrations = "../../migrations")]
async fn test_professores_insert_or_ignore(pool: PgPool) {
    let app = test_app(pool).await;

    for (nome, expected) in [
        ("Carla", StatusCode::CREATED),
        ("Ana", StatusCode::CREATED),
        ("Carla", StatusCode::OK),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/professores",
            Some(ADMIN),
            Some(json!({ "nome": nome })),
        )
        .await;
        assert_eq!(status, expected);
    }

    let (status, body) = send(&app, Method::GET, "/api/v1/professores", Some(READER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["Ana", "Carla"]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_block_is_not_an_error(pool: PgPool) {
    let app = test_app(pool).await;
    let block = json!({ "bloco": "3", "data_limite_entrega": "2026-11-30" });

    let (status, body) = send(&app, Method::POST, "/api/v1/blocos", Some(ADMIN), Some(block.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["outcome"], "created");
    assert_eq!(body["data"]["bloco"]["grupo"], "3-1");

    let (status, body) = send(&app, Method::POST, "/api/v1/blocos", Some(ADMIN), Some(block)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["outcome"], "already_exists");

    let (_, body) = send(&app, Method::GET, "/api/v1/blocos?bloco=3", Some(READER), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
