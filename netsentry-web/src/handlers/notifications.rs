use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::{error_handling::AppError, models::*, validation::Validator, AppState};

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub unread_only: Option<bool>,
}

async fn ensure_user_exists(state: &AppState, user_id: &str) -> Result<(), AppError> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;
    Ok(())
}

async fn unread_count(state: &AppState, user_id: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND read_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(state.db.pool())
    .await
    .map_err(AppError::Database)
}

/// The ten most recent notifications plus the unread total, for the inbox
/// dropdown.
pub async fn recent_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<RecentNotificationsResponse>, AppError> {
    ensure_user_exists(&state, &user_id).await?;

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC LIMIT 10",
    )
    .bind(&user_id)
    .fetch_all(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    let unread_count = unread_count(&state, &user_id).await?;

    Ok(Json(RecentNotificationsResponse {
        notifications: notifications.into_iter().map(Into::into).collect(),
        unread_count,
    }))
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<NotificationView>>, AppError> {
    ensure_user_exists(&state, &user_id).await?;
    let (limit, offset) = Validator::validate_pagination(query.limit, query.offset)?;

    let sql = if query.unread_only.unwrap_or(false) {
        "SELECT * FROM notifications WHERE user_id = ? AND read_at IS NULL ORDER BY created_at DESC LIMIT ? OFFSET ?"
    } else {
        "SELECT * FROM notifications WHERE user_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
    };

    let notifications = sqlx::query_as::<_, Notification>(sql)
        .bind(&user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Mark one notification read. Marking an already-read notification is not
/// an error; the response says which case happened.
pub async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    ensure_user_exists(&state, &user_id).await?;

    let existing = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE id = ? AND user_id = ?",
    )
    .bind(&notification_id)
    .bind(&user_id)
    .fetch_optional(state.db.pool())
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::not_found(format!("Notification {} not found", notification_id)))?;

    if existing.read_at.is_some() {
        return Ok(Json(serde_json::json!({
            "success": true,
            "already_read": true,
        })));
    }

    sqlx::query("UPDATE notifications SET read_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(&notification_id)
        .execute(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "already_read": false,
    })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_user_exists(&state, &user_id).await?;

    let result =
        sqlx::query("UPDATE notifications SET read_at = ? WHERE user_id = ? AND read_at IS NULL")
            .bind(Utc::now())
            .bind(&user_id)
            .execute(state.db.pool())
            .await
            .map_err(AppError::Database)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "marked": result.rows_affected(),
    })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    ensure_user_exists(&state, &user_id).await?;

    let result = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(&notification_id)
        .bind(&user_id)
        .execute(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Notification {} not found",
            notification_id
        )));
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn delete_all_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    ensure_user_exists(&state, &user_id).await?;

    let result = sqlx::query("DELETE FROM notifications WHERE user_id = ?")
        .bind(&user_id)
        .execute(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "deleted": result.rows_affected(),
    })))
}
