#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use chrono::Utc;
use netsentry_web::{create_app, AppState, WebConfig};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

/// App state backed by an in-memory database and a temp upload directory.
/// The TempDir must outlive the state so uploads have somewhere to land.
pub async fn test_state() -> (AppState, tempfile::TempDir) {
    let upload_dir = tempfile::tempdir().expect("create temp upload dir");
    let config = WebConfig {
        database_url: "sqlite::memory:".to_string(),
        upload_dir: upload_dir.path().to_string_lossy().to_string(),
        ..WebConfig::default()
    };
    let state = AppState::new(config).await.expect("init app state");
    (state, upload_dir)
}

pub async fn send_json(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let app = create_app(state.clone());
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn insert_user(state: &AppState, name: &str, role: &str) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO users (id, name, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(format!("{}@example.com", id))
    .bind(role)
    .bind(now)
    .bind(now)
    .execute(state.db.pool())
    .await
    .expect("insert user");
    id
}

pub async fn insert_log(state: &AppState, user_id: &str) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO network_logs (id, user_id, file_name, file_path, upload_date, status, analysis_result, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, 'pending', NULL, ?, ?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind("traffic.csv")
    .bind(format!("network_logs/{}_traffic.csv", id))
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(state.db.pool())
    .await
    .expect("insert network log");
    id
}

pub async fn insert_model(state: &AppState, name: &str) -> String {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO ml_models (id, name, description, file_path, trained_at, created_at, updated_at)
         VALUES (?, ?, NULL, NULL, NULL, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(state.db.pool())
    .await
    .expect("insert model");
    id
}

pub async fn notification_count(state: &AppState, user_id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(state.db.pool())
        .await
        .expect("count notifications")
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status");
}
