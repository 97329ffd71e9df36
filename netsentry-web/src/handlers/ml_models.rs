use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::{
    error_handling::AppError,
    models::*,
    validation::{ValidationError, Validator},
    AppState,
};

pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<MlModel>>, AppError> {
    let models = sqlx::query_as::<_, MlModel>("SELECT * FROM ml_models ORDER BY created_at DESC")
        .fetch_all(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(models))
}

pub async fn create_model(
    State(state): State<AppState>,
    Json(req): Json<CreateModelRequest>,
) -> Result<Json<MlModel>, AppError> {
    Validator::validate_model_name(&req.name)?;
    Validator::validate_model_description(req.description.as_ref())?;
    ensure_name_free(&state, &req.name, None).await?;

    let model = MlModel::new(req.name, req.description);

    sqlx::query(
        "INSERT INTO ml_models (id, name, description, file_path, trained_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&model.id)
    .bind(&model.name)
    .bind(&model.description)
    .bind(&model.file_path)
    .bind(model.trained_at)
    .bind(model.created_at)
    .bind(model.updated_at)
    .execute(state.db.pool())
    .await
    .map_err(|e: sqlx::Error| {
        tracing::error!("Failed to create model: {}", e);
        AppError::Database(e)
    })?;

    tracing::info!("Created ML model {} ({})", model.id, model.name);
    Ok(Json(model))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<MlModel>, AppError> {
    let model = sqlx::query_as::<_, MlModel>("SELECT * FROM ml_models WHERE id = ?")
        .bind(&model_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("ML model {} not found", model_id)))?;

    Ok(Json(model))
}

pub async fn update_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
    Json(req): Json<CreateModelRequest>,
) -> Result<Json<MlModel>, AppError> {
    Validator::validate_model_name(&req.name)?;
    Validator::validate_model_description(req.description.as_ref())?;

    sqlx::query_scalar::<_, String>("SELECT id FROM ml_models WHERE id = ?")
        .bind(&model_id)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::not_found(format!("ML model {} not found", model_id)))?;

    ensure_name_free(&state, &req.name, Some(&model_id)).await?;

    sqlx::query("UPDATE ml_models SET name = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(&req.name)
        .bind(&req.description)
        .bind(Utc::now())
        .bind(&model_id)
        .execute(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    let model = sqlx::query_as::<_, MlModel>("SELECT * FROM ml_models WHERE id = ?")
        .bind(&model_id)
        .fetch_one(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    Ok(Json(model))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let result = sqlx::query("DELETE FROM ml_models WHERE id = ?")
        .bind(&model_id)
        .execute(state.db.pool())
        .await
        .map_err(|e: sqlx::Error| {
            tracing::error!("Failed to delete model {}: {}", model_id, e);
            AppError::Database(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "ML model {} not found",
            model_id
        )));
    }

    tracing::info!("Deleted ML model {}", model_id);
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Model names are unique; on update the model's own row doesn't count.
async fn ensure_name_free(
    state: &AppState,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<(), AppError> {
    let existing = sqlx::query_scalar::<_, String>("SELECT id FROM ml_models WHERE name = ?")
        .bind(name)
        .fetch_optional(state.db.pool())
        .await
        .map_err(AppError::Database)?;

    match existing {
        Some(id) if Some(id.as_str()) != exclude_id => {
            Err(ValidationError::ModelNameTaken(name.to_string()).into())
        }
        _ => Ok(()),
    }
}
