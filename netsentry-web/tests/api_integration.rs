mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use netsentry_web::create_app;
use serde_json::json;
use tower::ServiceExt;

use common::*;

#[tokio::test]
async fn test_health_endpoint() {
    let (state, _dir) = test_state().await;
    let response = send_json(&state, "GET", "/health", None).await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let (state, _dir) = test_state().await;
    let response = send_json(&state, "GET", "/api/nope", None).await;
    assert_status(&response, StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn test_create_user_creates_default_preferences() {
    let (state, _dir) = test_state().await;

    let response = send_json(
        &state,
        "POST",
        "/api/users",
        Some(json!({
            "name": "Dana",
            "email": "dana@example.com",
            "role": "analyst"
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let user = body_json(response).await;
    assert_eq!(user["role"], "Analyst");
    let user_id = user["id"].as_str().unwrap();

    let response = send_json(
        &state,
        "GET",
        &format!("/api/users/{}/preferences", user_id),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let prefs = body_json(response).await;
    assert_eq!(prefs["email_alerts"], true);
    assert_eq!(prefs["critical_alerts_only"], false);
}

#[tokio::test]
async fn test_create_user_unknown_role_folds_to_viewer() {
    let (state, _dir) = test_state().await;

    let response = send_json(
        &state,
        "POST",
        "/api/users",
        Some(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "role": "superuser"
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "Viewer");
}

#[tokio::test]
async fn test_create_user_duplicate_email_rejected() {
    let (state, _dir) = test_state().await;

    let payload = json!({
        "name": "Dana",
        "email": "dana@example.com",
        "role": "admin"
    });
    let response = send_json(&state, "POST", "/api/users", Some(payload.clone())).await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(&state, "POST", "/api/users", Some(payload)).await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_user_invalid_email_rejected() {
    let (state, _dir) = test_state().await;

    let response = send_json(
        &state,
        "POST",
        "/api/users",
        Some(json!({
            "name": "Dana",
            "email": "not-an-email",
            "role": "admin"
        })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_preferences_partial() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;

    let response = send_json(
        &state,
        "PATCH",
        &format!("/api/users/{}/preferences", user_id),
        Some(json!({
            "critical_alerts_only": true,
            "alert_types": ["critical", "high"]
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let prefs = body_json(response).await;
    assert_eq!(prefs["critical_alerts_only"], true);
    // Untouched fields keep their defaults
    assert_eq!(prefs["email_alerts"], true);
}

#[tokio::test]
async fn test_update_preferences_rejects_unknown_severity() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;

    let response = send_json(
        &state,
        "PATCH",
        &format!("/api/users/{}/preferences", user_id),
        Some(json!({ "alert_types": ["urgent"] })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_alert_crud_roundtrip() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;
    let log_id = insert_log(&state, &user_id).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "Port Scan",
            "severity": "HIGH",
            "source_ip": "10.0.0.5",
            "confidence_score": 0.92
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let alert = body_json(response).await;
    assert_eq!(alert["severity"], "high");
    assert_eq!(alert["status"], "new");
    let alert_id = alert["id"].as_str().unwrap().to_string();

    let response = send_json(&state, "GET", &format!("/api/alerts/{}", alert_id), None).await;
    assert_status(&response, StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["model_name"], "cnn-v1");
    assert_eq!(fetched["file_name"], "traffic.csv");

    let response = send_json(
        &state,
        "PUT",
        &format!("/api/alerts/{}", alert_id),
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "Port Scan",
            "severity": "high",
            "status": "investigating"
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "investigating");

    let response = send_json(&state, "GET", "/api/alerts", None).await;
    assert_status(&response, StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["alerts"].as_array().unwrap().len(), 1);

    let response = send_json(&state, "DELETE", &format!("/api/alerts/{}", alert_id), None).await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(&state, "GET", &format!("/api/alerts/{}", alert_id), None).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_alert_invalid_severity_rejected() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;
    let log_id = insert_log(&state, &user_id).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "Port Scan",
            "severity": "urgent"
        })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_alert_missing_log_rejected() {
    let (state, _dir) = test_state().await;
    let model_id = insert_model(&state, "cnn-v1").await;

    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": "no-such-log",
            "ml_model_id": model_id,
            "attack_type": "Port Scan",
            "severity": "low"
        })),
    )
    .await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_alert_invalid_ip_rejected() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;
    let log_id = insert_log(&state, &user_id).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "Port Scan",
            "severity": "low",
            "source_ip": "999.0.0.1"
        })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_assign_alert_idempotent() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;
    let log_id = insert_log(&state, &user_id).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "DDoS",
            "severity": "medium"
        })),
    )
    .await;
    let alert_id = body_json(response).await["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = send_json(
            &state,
            "POST",
            &format!("/api/alerts/{}/assign", alert_id),
            Some(json!({ "user_id": user_id })),
        )
        .await;
        assert_status(&response, StatusCode::OK);
    }

    let assignments = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM user_alerts WHERE alert_id = ?",
    )
    .bind(&alert_id)
    .fetch_one(state.db.pool())
    .await
    .unwrap();
    assert_eq!(assignments, 1);
}

#[tokio::test]
async fn test_model_crud_and_unique_name() {
    let (state, _dir) = test_state().await;

    let response = send_json(
        &state,
        "POST",
        "/api/ml-models",
        Some(json!({ "name": "cnn-v1", "description": "baseline" })),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let model_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Same name again is rejected
    let response = send_json(
        &state,
        "POST",
        "/api/ml-models",
        Some(json!({ "name": "cnn-v1" })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);

    // Renaming a model to its own name is fine
    let response = send_json(
        &state,
        "PUT",
        &format!("/api/ml-models/{}", model_id),
        Some(json!({ "name": "cnn-v1", "description": "retrained" })),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_json(response).await["description"], "retrained");

    let response = send_json(&state, "DELETE", &format!("/api/ml-models/{}", model_id), None).await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(&state, "GET", &format!("/api/ml-models/{}", model_id), None).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

fn multipart_body(boundary: &str, user_id: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\ncontent-type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(
        format!(
            "\r\n--{boundary}\r\ncontent-disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n--{boundary}--\r\n"
        )
        .as_bytes(),
    );
    body
}

async fn upload(
    state: &netsentry_web::AppState,
    user_id: &str,
    filename: &str,
    content: &[u8],
) -> axum::http::Response<Body> {
    let boundary = "netsentry-test-boundary";
    let body = multipart_body(boundary, user_id, filename, content);
    let request = Request::builder()
        .method("POST")
        .uri("/api/network-logs")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    create_app(state.clone()).oneshot(request).await.unwrap()
}

#[tokio::test]
async fn test_upload_stores_file_and_record() {
    let (state, dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;

    let response = upload(&state, &user_id, "capture.csv", b"src,dst\n1,2\n").await;
    assert_status(&response, StatusCode::OK);

    let log = body_json(response).await;
    assert_eq!(log["file_name"], "capture.csv");
    assert_eq!(log["status"], "pending");

    let stored = dir
        .path()
        .join(log["file_path"].as_str().unwrap());
    assert!(stored.exists(), "uploaded file should be on disk");

    // Detail view includes (empty) alerts
    let log_id = log["id"].as_str().unwrap();
    let response = send_json(&state, "GET", &format!("/api/network-logs/{}", log_id), None).await;
    let detail = body_json(response).await;
    assert_eq!(detail["alerts"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_rejects_bad_extension() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;

    let response = upload(&state, &user_id, "malware.exe", b"MZ").await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_unknown_user_rejected() {
    let (state, _dir) = test_state().await;

    let response = upload(&state, "ghost", "capture.csv", b"a,b\n").await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_log_status_update_and_delete() {
    let (state, dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;

    let response = upload(&state, &user_id, "capture.csv", b"a,b\n").await;
    let log = body_json(response).await;
    let log_id = log["id"].as_str().unwrap().to_string();
    let stored = dir.path().join(log["file_path"].as_str().unwrap());

    let response = send_json(
        &state,
        "PATCH",
        &format!("/api/network-logs/{}", log_id),
        Some(json!({ "status": "processed" })),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "processed");

    let response = send_json(
        &state,
        "PATCH",
        &format!("/api/network-logs/{}", log_id),
        Some(json!({ "status": "finished" })),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send_json(
        &state,
        "DELETE",
        &format!("/api/network-logs/{}", log_id),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert!(!stored.exists(), "stored file should be removed");
}

#[tokio::test]
async fn test_delete_log_tolerates_missing_file() {
    let (state, _dir) = test_state().await;
    let user_id = insert_user(&state, "Dana", "Admin").await;
    // Fixture row has a file_path but nothing on disk
    let log_id = insert_log(&state, &user_id).await;

    let response = send_json(
        &state,
        "DELETE",
        &format!("/api/network-logs/{}", log_id),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(&state, "GET", &format!("/api/network-logs/{}", log_id), None).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_inbox_flow() {
    let (state, _dir) = test_state().await;
    let actor = insert_user(&state, "Dana", "Admin").await;
    let log_id = insert_log(&state, &actor).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    // Creating an alert as Dana gives her a self-acknowledgement
    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "Brute Force",
            "severity": "low",
            "acting_user_id": actor
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(
        &state,
        "GET",
        &format!("/api/users/{}/notifications/recent", actor),
        None,
    )
    .await;
    let inbox = body_json(response).await;
    assert_eq!(inbox["unread_count"], 1);
    let notification = &inbox["notifications"][0];
    assert_eq!(notification["type"], "alert_created");
    assert_eq!(notification["is_read"], false);
    let notification_id = notification["id"].as_str().unwrap().to_string();

    // Mark it read, twice; the second is a no-op
    let uri = format!(
        "/api/users/{}/notifications/{}/read",
        actor, notification_id
    );
    let response = send_json(&state, "POST", &uri, None).await;
    assert_eq!(body_json(response).await["already_read"], false);
    let response = send_json(&state, "POST", &uri, None).await;
    assert_eq!(body_json(response).await["already_read"], true);

    let response = send_json(
        &state,
        "GET",
        &format!("/api/users/{}/notifications/recent", actor),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["unread_count"], 0);

    let response = send_json(
        &state,
        "DELETE",
        &format!("/api/users/{}/notifications", actor),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["deleted"], 1);
    assert_eq!(notification_count(&state, &actor).await, 0);
}

#[tokio::test]
async fn test_mark_all_read() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let analyst = insert_user(&state, "Dana", "Analyst").await;
    let log_id = insert_log(&state, &admin).await;
    let model_id = insert_model(&state, "cnn-v1").await;

    // A critical alert gives every Admin two notifications
    let response = send_json(
        &state,
        "POST",
        "/api/alerts",
        Some(json!({
            "network_log_id": log_id,
            "ml_model_id": model_id,
            "attack_type": "DDoS",
            "severity": "critical",
            "acting_user_id": analyst
        })),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let response = send_json(
        &state,
        "POST",
        &format!("/api/users/{}/notifications/read-all", admin),
        None,
    )
    .await;
    assert_eq!(body_json(response).await["marked"], 2);
}
