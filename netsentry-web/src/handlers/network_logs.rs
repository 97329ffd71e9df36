use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{error_handling::AppError, models::*, validation::Validator, AppState};

#[derive(Debug, Deserialize)]
pub struct LogListQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Accept a network log upload: a multipart `file` part plus a `user_id`
/// text part. The file lands under `{upload_dir}/network_logs/` with a
/// unique prefix; the record stores the storage-relative path.
pub async fn upload_log(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<NetworkLog>, AppError> {
    let mut file_name: Option<String> = None;
    let mut file_data: Option<bytes::Bytes> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart request: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(|n| n.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    AppError::bad_request(format!("Failed to read file data: {}", e))
                })?);
            }
            Some("user_id") => {
                user_id = Some(field.text().await.map_err(|e| {
                    AppError::bad_request(format!("Failed to read user_id field: {}", e))
                })?);
            }
            _ => {}
        }
    }

    let file_name = file_name.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file data"))?;
    let user_id = user_id.ok_or_else(|| AppError::bad_request("Missing user_id field"))?;

    let sanitized =
        Validator::validate_file_upload(&file_name, file_data.len(), state.config.max_upload_size)?;

    sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user_id)))?;

    let unique_name = format!("{}_{}", Uuid::new_v4(), sanitized);
    let relative_path = format!("network_logs/{}", unique_name);
    let storage_dir = std::path::Path::new(&state.config.upload_dir).join("network_logs");

    tokio::fs::create_dir_all(&storage_dir).await.map_err(|e| {
        AppError::file_processing(format!("Failed to create upload directory: {}", e))
    })?;
    let stored_path = storage_dir.join(&unique_name);
    tokio::fs::write(&stored_path, &file_data)
        .await
        .map_err(|e| AppError::file_processing(format!("Failed to store uploaded file: {}", e)))?;

    let log = NetworkLog::new(user_id, sanitized, relative_path);

    let insert = sqlx::query(
        "INSERT INTO network_logs (id, user_id, file_name, file_path, upload_date, status, analysis_result, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&log.id)
    .bind(&log.user_id)
    .bind(&log.file_name)
    .bind(&log.file_path)
    .bind(log.upload_date)
    .bind(&log.status)
    .bind(&log.analysis_result)
    .bind(log.created_at)
    .bind(log.updated_at)
    .execute(state.db.pool())
    .await;

    if let Err(e) = insert {
        tracing::error!("Failed to record uploaded log: {}", e);
        // Don't leave an orphaned file behind
        if let Err(e) = tokio::fs::remove_file(&stored_path).await {
            tracing::warn!("Failed to clean up {}: {}", stored_path.display(), e);
        }
        return Err(AppError::Database(e));
    }

    tracing::info!("Stored network log {} ({})", log.id, log.file_name);

    spawn_processor(&state, &log.id);

    Ok(Json(log))
}

/// Kick off the configured external analysis command, if any. The upload
/// succeeds regardless; processing state is reported back via the status
/// endpoint.
fn spawn_processor(state: &AppState, log_id: &str) {
    let Some(cmd) = state.config.processor_command.clone() else {
        return;
    };
    let log_id = log_id.to_string();

    tokio::spawn(async move {
        let result = tokio::process::Command::new(&cmd).arg(&log_id).spawn();
        match result {
            Ok(_) => tracing::info!("Spawned processor for log {}", log_id),
            Err(e) => tracing::warn!("Failed to spawn processor for log {}: {}", log_id, e),
        }
    });
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogListQuery>,
) -> Result<Json<Vec<NetworkLog>>, AppError> {
    let (limit, offset) = Validator::validate_pagination(query.limit, query.offset)?;

    let logs = match &query.user_id {
        Some(user_id) => {
            sqlx::query_as::<_, NetworkLog>(
                "SELECT * FROM network_logs WHERE user_id = ? ORDER BY upload_date DESC LIMIT ? OFFSET ?",
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(state.db.pool())
            .await
        }
        None => {
            sqlx::query_as::<_, NetworkLog>(
                "SELECT * FROM network_logs ORDER BY upload_date DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(state.db.pool())
            .await
        }
    }
    .map_err(AppError::Database)?;

    Ok(Json(logs))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<Json<NetworkLogDetail>, AppError> {
    let log = sqlx::query_as::<_, NetworkLog>("SELECT * FROM network_logs WHERE id = ?")
        .bind(&log_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Network log {} not found", log_id)))?;

    let alerts = sqlx::query_as::<_, Alert>(
        "SELECT * FROM alerts WHERE network_log_id = ? ORDER BY detected_at DESC",
    )
    .bind(&log_id)
    .fetch_all(state.db.pool())
    .await
    .map_err(AppError::Database)?;

    Ok(Json(NetworkLogDetail { log, alerts }))
}

pub async fn update_log_status(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
    Json(req): Json<UpdateLogStatusRequest>,
) -> Result<Json<NetworkLog>, AppError> {
    Validator::validate_log_status(&req.status)?;

    let result = sqlx::query("UPDATE network_logs SET status = ?, updated_at = ? WHERE id = ?")
        .bind(req.status.to_lowercase())
        .bind(Utc::now())
        .bind(&log_id)
        .execute(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "Network log {} not found",
            log_id
        )));
    }

    let log = sqlx::query_as::<_, NetworkLog>("SELECT * FROM network_logs WHERE id = ?")
        .bind(&log_id)
        .fetch_one(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(log))
}

/// Delete a log record and its stored file. The database row goes first;
/// a missing file on disk is only a warning.
pub async fn delete_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let log = sqlx::query_as::<_, NetworkLog>("SELECT * FROM network_logs WHERE id = ?")
        .bind(&log_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("Network log {} not found", log_id)))?;

    sqlx::query("DELETE FROM network_logs WHERE id = ?")
        .bind(&log_id)
        .execute(state.db.pool())
        .await
        .map_err(|e: sqlx::Error| {
            tracing::error!("Failed to delete network log {}: {}", log_id, e);
            AppError::Database(e)
        })?;

    let full_path = std::path::Path::new(&state.config.upload_dir).join(&log.file_path);
    if let Err(e) = tokio::fs::remove_file(&full_path).await {
        tracing::warn!(
            "Failed to remove stored file {}: {}",
            full_path.display(),
            e
        );
    }

    tracing::info!("Deleted network log {}", log_id);
    Ok(Json(serde_json::json!({ "success": true })))
}
