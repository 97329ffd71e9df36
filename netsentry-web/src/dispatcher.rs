//! Notification fan-out for newly created alerts.
//!
//! Dispatch is best-effort relative to the alert write: the alert is
//! already committed when this runs, and nothing here can fail the
//! request. Individual recipient failures are logged and skipped.

use futures::future::join_all;
use netsentry_core::{eligible_roles, NotificationPayload, Role, Severity};
use sqlx::{Pool, Sqlite};

use crate::models::{Alert, Notification};

/// Determine the recipient set for a newly created alert and persist one
/// notification row per (recipient, payload) pair.
///
/// Semantics:
/// 1. The acting user always gets a self-acknowledgement, regardless of
///    role.
/// 2. Critical alerts additionally broadcast a dedicated critical-threat
///    payload to every Admin/Analyst.
/// 3. The role-notification matrix distributes the standard payload,
///    excluding the acting user (already covered by step 1).
///
/// An Admin/Analyst therefore receives two notifications for a critical
/// alert (one critical-specific, one generic). The duplication is
/// intentional.
pub async fn dispatch_alert_created(
    pool: &Pool<Sqlite>,
    alert: &Alert,
    acting_user_id: Option<&str>,
) {
    if let Err(e) = try_dispatch(pool, alert, acting_user_id).await {
        tracing::error!(
            alert_id = %alert.id,
            "Failed to dispatch notifications for alert: {}",
            e
        );
    }
}

async fn try_dispatch(
    pool: &Pool<Sqlite>,
    alert: &Alert,
    acting_user_id: Option<&str>,
) -> Result<(), sqlx::Error> {
    let standard = NotificationPayload::alert_created(&alert.id, &alert.attack_type, &alert.severity);

    // Step 1: self-acknowledgement to the acting user.
    if let Some(actor_id) = acting_user_id {
        deliver(pool, actor_id, &standard).await;
    }

    // The roster is read once at dispatch time; roles are parsed into the
    // closed enum so eligibility is a capability check, not string
    // comparison.
    let roster: Vec<(String, String)> = sqlx::query_as("SELECT id, role FROM users")
        .fetch_all(pool)
        .await?;

    let severity = alert.severity.parse::<Severity>().ok();

    // Step 2: dedicated critical-threat broadcast to admins and analysts.
    if severity == Some(Severity::Critical) {
        let critical = NotificationPayload::critical_threat(&alert.id, &alert.attack_type);
        let sends = roster
            .iter()
            .filter(|(_, role)| Role::parse(role).receives_critical_broadcast())
            .map(|(user_id, _)| deliver(pool, user_id, &critical));
        join_all(sends).await;
    }

    // Step 3: standard payload per the role matrix, excluding the actor.
    let targets = eligible_roles(severity);
    let sends = roster
        .iter()
        .filter(|(user_id, role)| {
            targets.contains(&Role::parse(role)) && Some(user_id.as_str()) != acting_user_id
        })
        .map(|(user_id, _)| deliver(pool, user_id, &standard));
    join_all(sends).await;

    Ok(())
}

/// Persist one notification for one recipient. A failure here is isolated:
/// it is logged and the remaining recipients are still attempted.
async fn deliver(pool: &Pool<Sqlite>, user_id: &str, payload: &NotificationPayload) {
    let notification = Notification::from_payload(user_id, payload);

    let result = sqlx::query(
        "INSERT INTO notifications (id, user_id, kind, title, message, severity, icon, color, action_url, priority, created_at, read_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(&notification.kind)
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.severity)
    .bind(&notification.icon)
    .bind(&notification.color)
    .bind(&notification.action_url)
    .bind(&notification.priority)
    .bind(notification.created_at)
    .bind(notification.read_at)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::error!(
            user_id = %user_id,
            kind = %notification.kind,
            "Failed to deliver notification: {}",
            e
        );
    }
}
