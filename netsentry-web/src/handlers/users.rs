use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use netsentry_core::Role;

use crate::{error_handling::AppError, models::*, validation::Validator, AppState};

/// Create a user together with their default notification preferences.
/// Both rows go in one transaction so a user never exists without
/// preferences.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    Validator::validate_user_name(&req.name)?;
    Validator::validate_email(&req.email)?;

    let existing = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = ?")
        .bind(&req.email)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?;
    if existing.is_some() {
        return Err(AppError::validation(format!(
            "email '{}' is already registered",
            req.email
        )));
    }

    // Unrecognized role strings fold to Viewer.
    let role = Role::parse(&req.role);
    let user = User::new(req.name, req.email, role.as_str().to_string());
    let prefs = NotificationPreference::defaults_for(user.id.clone());

    let mut tx = state.db.pool().begin().await.map_err(AppError::Database)?;

    sqlx::query(
        "INSERT INTO users (id, name, email, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.role)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(AppError::Database)?;

    sqlx::query(
        "INSERT INTO notification_preferences (id, user_id, email_alerts, browser_notifications, sound_notifications, critical_alerts_only, alert_types, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&prefs.id)
    .bind(&prefs.user_id)
    .bind(prefs.email_alerts)
    .bind(prefs.browser_notifications)
    .bind(prefs.sound_notifications)
    .bind(prefs.critical_alerts_only)
    .bind(&prefs.alert_types)
    .bind(prefs.created_at)
    .bind(prefs.updated_at)
    .execute(&mut *tx)
    .await
    .map_err(AppError::Database)?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!("Created user {} ({})", user.id, user.role);
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;

    Ok(Json(user))
}

/// Read preferences, materializing the defaults row if it is missing.
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<NotificationPreference>, AppError> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;

    let prefs = fetch_or_create_preferences(&state, &user_id).await?;
    Ok(Json(prefs))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<NotificationPreference>, AppError> {
    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;

    if let Some(types) = &req.alert_types {
        for raw in types {
            Validator::validate_severity(raw)?;
        }
    }

    let mut prefs = fetch_or_create_preferences(&state, &user_id).await?;

    if let Some(v) = req.email_alerts {
        prefs.email_alerts = v;
    }
    if let Some(v) = req.browser_notifications {
        prefs.browser_notifications = v;
    }
    if let Some(v) = req.sound_notifications {
        prefs.sound_notifications = v;
    }
    if let Some(v) = req.critical_alerts_only {
        prefs.critical_alerts_only = v;
    }
    if let Some(types) = req.alert_types {
        prefs.alert_types = serde_json::to_string(&types)
            .map_err(|e| AppError::internal(format!("Failed to encode alert types: {}", e)))?;
    }
    prefs.updated_at = Utc::now();

    sqlx::query(
        "UPDATE notification_preferences
         SET email_alerts = ?, browser_notifications = ?, sound_notifications = ?, critical_alerts_only = ?, alert_types = ?, updated_at = ?
         WHERE user_id = ?",
    )
    .bind(prefs.email_alerts)
    .bind(prefs.browser_notifications)
    .bind(prefs.sound_notifications)
    .bind(prefs.critical_alerts_only)
    .bind(&prefs.alert_types)
    .bind(prefs.updated_at)
    .bind(&user_id)
    .execute(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    Ok(Json(prefs))
}

async fn fetch_or_create_preferences(
    state: &AppState,
    user_id: &str,
) -> Result<NotificationPreference, AppError> {
    let existing = sqlx::query_as::<_, NotificationPreference>(
        "SELECT * FROM notification_preferences WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    if let Some(prefs) = existing {
        return Ok(prefs);
    }

    let prefs = NotificationPreference::defaults_for(user_id.to_string());
    sqlx::query(
        "INSERT INTO notification_preferences (id, user_id, email_alerts, browser_notifications, sound_notifications, critical_alerts_only, alert_types, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&prefs.id)
    .bind(&prefs.user_id)
    .bind(prefs.email_alerts)
    .bind(prefs.browser_notifications)
    .bind(prefs.sound_notifications)
    .bind(prefs.critical_alerts_only)
    .bind(&prefs.alert_types)
    .bind(prefs.created_at)
    .bind(prefs.updated_at)
    .execute(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    tracing::info!("Materialized default preferences for user {}", user_id);
    Ok(prefs)
}
