mod common;

use netsentry_web::dispatcher::dispatch_alert_created;
use netsentry_web::models::Alert;

use common::*;

fn alert(severity: &str) -> Alert {
    Alert::new(
        "log-1".to_string(),
        "model-1".to_string(),
        "Port Scan".to_string(),
        severity.to_string(),
        None,
        None,
        Some(0.9),
        None,
    )
}

async fn kinds_for(state: &netsentry_web::AppState, user_id: &str) -> Vec<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT kind FROM notifications WHERE user_id = ? ORDER BY kind",
    )
    .bind(user_id)
    .fetch_all(state.db.pool())
    .await
    .unwrap()
}

#[tokio::test]
async fn test_critical_alert_fan_out() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let analyst = insert_user(&state, "Dana", "Analyst").await;
    let viewer = insert_user(&state, "Guest", "Viewer").await;

    dispatch_alert_created(state.db.pool(), &alert("critical"), Some(&analyst)).await;

    // Acting analyst: self-acknowledgement plus the critical broadcast
    assert_eq!(
        kinds_for(&state, &analyst).await,
        vec!["alert_created", "critical_threat_detected"]
    );
    // Admin: critical broadcast plus the standard matrix notification
    assert_eq!(
        kinds_for(&state, &admin).await,
        vec!["alert_created", "critical_threat_detected"]
    );
    // Viewers get nothing
    assert_eq!(notification_count(&state, &viewer).await, 0);
}

#[tokio::test]
async fn test_high_severity_reaches_admins_and_analysts_once() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let analyst = insert_user(&state, "Dana", "Analyst").await;
    let viewer = insert_user(&state, "Guest", "Viewer").await;

    dispatch_alert_created(state.db.pool(), &alert("high"), None).await;

    assert_eq!(kinds_for(&state, &admin).await, vec!["alert_created"]);
    assert_eq!(kinds_for(&state, &analyst).await, vec!["alert_created"]);
    assert_eq!(notification_count(&state, &viewer).await, 0);
}

#[tokio::test]
async fn test_low_severity_goes_to_admins_only() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let analyst = insert_user(&state, "Dana", "Analyst").await;

    dispatch_alert_created(state.db.pool(), &alert("low"), None).await;

    assert_eq!(notification_count(&state, &admin).await, 1);
    assert_eq!(notification_count(&state, &analyst).await, 0);
}

#[tokio::test]
async fn test_acting_user_not_notified_twice_by_matrix() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let other_admin = insert_user(&state, "Backup", "Admin").await;

    dispatch_alert_created(state.db.pool(), &alert("medium"), Some(&admin)).await;

    // The actor gets exactly the self-acknowledgement
    assert_eq!(notification_count(&state, &admin).await, 1);
    assert_eq!(notification_count(&state, &other_admin).await, 1);
}

#[tokio::test]
async fn test_unparseable_severity_falls_back_to_admins() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;
    let analyst = insert_user(&state, "Dana", "Analyst").await;

    dispatch_alert_created(state.db.pool(), &alert("catastrophic"), None).await;

    assert_eq!(notification_count(&state, &admin).await, 1);
    assert_eq!(notification_count(&state, &analyst).await, 0);
}

#[tokio::test]
async fn test_self_ack_even_without_roster_match() {
    let (state, _dir) = test_state().await;
    let viewer = insert_user(&state, "Guest", "Viewer").await;

    dispatch_alert_created(state.db.pool(), &alert("high"), Some(&viewer)).await;

    // Viewers are outside the matrix but still get their own acknowledgement
    assert_eq!(kinds_for(&state, &viewer).await, vec!["alert_created"]);
}

#[tokio::test]
async fn test_notification_payload_content() {
    let (state, _dir) = test_state().await;
    let admin = insert_user(&state, "Root", "Admin").await;

    let alert = alert("critical");
    dispatch_alert_created(state.db.pool(), &alert, None).await;

    let (title, priority, action_url): (String, String, Option<String>) = sqlx::query_as(
        "SELECT title, priority, action_url FROM notifications
         WHERE user_id = ? AND kind = 'critical_threat_detected'",
    )
    .bind(&admin)
    .fetch_one(state.db.pool())
    .await
    .unwrap();

    assert_eq!(title, "Critical Threat Detected");
    assert_eq!(priority, "critical");
    assert_eq!(action_url, Some(format!("/alerts/{}", alert.id)));
}
