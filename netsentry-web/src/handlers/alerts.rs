use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::{dispatcher, error_handling::AppError, models::*, validation::Validator, AppState};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn validate_alert_fields(
    attack_type: &str,
    severity: &str,
    source_ip: Option<&String>,
    destination_ip: Option<&String>,
    confidence_score: Option<f64>,
    description: Option<&String>,
) -> Result<(), AppError> {
    Validator::validate_attack_type(attack_type)?;
    Validator::validate_severity(severity)?;
    Validator::validate_ip(source_ip)?;
    Validator::validate_ip(destination_ip)?;
    Validator::validate_confidence(confidence_score)?;
    Validator::validate_description(description)?;
    Ok(())
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<AlertListResponse>, AppError> {
    let (limit, offset) = Validator::validate_pagination(pagination.limit, pagination.offset)?;

    let alerts = sqlx::query_as::<_, AlertListItem>(
        "SELECT a.*, nl.file_name as file_name, m.name as model_name
         FROM alerts a
         LEFT JOIN network_logs nl ON a.network_log_id = nl.id
         LEFT JOIN ml_models m ON a.ml_model_id = m.id
         ORDER BY a.detected_at DESC LIMIT ? OFFSET ?",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM alerts")
        .fetch_one(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(AlertListResponse { alerts, total }))
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(req): Json<CreateAlertRequest>,
) -> Result<Json<Alert>, AppError> {
    validate_alert_fields(
        &req.attack_type,
        &req.severity,
        req.source_ip.as_ref(),
        req.destination_ip.as_ref(),
        req.confidence_score,
        req.description.as_ref(),
    )?;

    // Referenced records must exist before the write.
    sqlx::query_scalar::<_, String>("SELECT id FROM network_logs WHERE id = ?")
        .bind(&req.network_log_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Network log {} not found", req.network_log_id)))?;

    sqlx::query_scalar::<_, String>("SELECT id FROM ml_models WHERE id = ?")
        .bind(&req.ml_model_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("ML model {} not found", req.ml_model_id)))?;

    let alert = Alert::new(
        req.network_log_id,
        req.ml_model_id,
        req.attack_type,
        req.severity.to_lowercase(),
        req.source_ip,
        req.destination_ip,
        req.confidence_score,
        req.description,
    );

    sqlx::query(
        "INSERT INTO alerts (id, network_log_id, ml_model_id, attack_type, severity, source_ip, destination_ip, confidence_score, status, detected_at, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&alert.id)
    .bind(&alert.network_log_id)
    .bind(&alert.ml_model_id)
    .bind(&alert.attack_type)
    .bind(&alert.severity)
    .bind(&alert.source_ip)
    .bind(&alert.destination_ip)
    .bind(alert.confidence_score)
    .bind(&alert.status)
    .bind(alert.detected_at)
    .bind(&alert.description)
    .bind(alert.created_at)
    .bind(alert.updated_at)
    .execute(state.db.pool())
    .await
    .map_err(|e: sqlx::Error| {
        tracing::error!("Failed to create alert: {}", e);
        AppError::Database(e)
    })?;

    tracing::info!("Created alert {} ({})", alert.id, alert.severity);

    // Best-effort: notification failures never roll back the alert.
    dispatcher::dispatch_alert_created(state.db.pool(), &alert, req.acting_user_id.as_deref())
        .await;

    Ok(Json(alert))
}

pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertListItem>, AppError> {
    let alert = sqlx::query_as::<_, AlertListItem>(
        "SELECT a.*, nl.file_name as file_name, m.name as model_name
         FROM alerts a
         LEFT JOIN network_logs nl ON a.network_log_id = nl.id
         LEFT JOIN ml_models m ON a.ml_model_id = m.id
         WHERE a.id = ?",
    )
    .bind(&alert_id)
    .fetch_optional(state.db.pool())
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::not_found(format!("Alert {} not found", alert_id)))?;

    Ok(Json(alert))
}

pub async fn update_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Json(req): Json<UpdateAlertRequest>,
) -> Result<Json<Alert>, AppError> {
    validate_alert_fields(
        &req.attack_type,
        &req.severity,
        req.source_ip.as_ref(),
        req.destination_ip.as_ref(),
        req.confidence_score,
        req.description.as_ref(),
    )?;
    if let Some(status) = &req.status {
        Validator::validate_alert_status(status)?;
    }

    let existing = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Alert {} not found", alert_id)))?;

    sqlx::query_scalar::<_, String>("SELECT id FROM network_logs WHERE id = ?")
        .bind(&req.network_log_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Network log {} not found", req.network_log_id)))?;

    sqlx::query_scalar::<_, String>("SELECT id FROM ml_models WHERE id = ?")
        .bind(&req.ml_model_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("ML model {} not found", req.ml_model_id)))?;

    // Status is optional on update; absent means keep the current one.
    let status = req
        .status
        .map(|s| s.to_lowercase())
        .unwrap_or(existing.status);
    let updated_at = Utc::now();

    sqlx::query(
        "UPDATE alerts SET network_log_id = ?, ml_model_id = ?, attack_type = ?, severity = ?, source_ip = ?, destination_ip = ?, confidence_score = ?, status = ?, description = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&req.network_log_id)
    .bind(&req.ml_model_id)
    .bind(&req.attack_type)
    .bind(req.severity.to_lowercase())
    .bind(&req.source_ip)
    .bind(&req.destination_ip)
    .bind(req.confidence_score)
    .bind(&status)
    .bind(&req.description)
    .bind(updated_at)
    .bind(&alert_id)
    .execute(state.db.pool())
    .await
    .map_err(|e: sqlx::Error| {
        tracing::error!("Failed to update alert {}: {}", alert_id, e);
        AppError::Database(e)
    })?;

    let alert = sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .fetch_one(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(alert))
}

pub async fn delete_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .execute(state.db.pool())
        .await
        .map_err(|e: sqlx::Error| {
            tracing::error!("Failed to delete alert {}: {}", alert_id, e);
            AppError::Database(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Alert {} not found", alert_id)));
    }

    tracing::info!("Deleted alert {}", alert_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Assign a user to an alert; re-assignment refreshes assigned_at.
pub async fn assign_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Json(req): Json<AssignAlertRequest>,
) -> Result<Json<Value>, AppError> {
    sqlx::query_scalar::<_, String>("SELECT id FROM alerts WHERE id = ?")
        .bind(&alert_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Alert {} not found", alert_id)))?;

    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
        .bind(&req.user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", req.user_id)))?;

    sqlx::query(
        "INSERT INTO user_alerts (alert_id, user_id, assigned_at) VALUES (?, ?, ?)
         ON CONFLICT (alert_id, user_id) DO UPDATE SET assigned_at = excluded.assigned_at",
    )
    .bind(&alert_id)
    .bind(&req.user_id)
    .bind(Utc::now())
    .execute(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    Ok(Json(serde_json::json!({ "success": true })))
}
