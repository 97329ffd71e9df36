pub mod config;
pub mod database;
pub mod dispatcher;
pub mod error_handling;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validation;

use axum::{extract::DefaultBodyLimit, middleware, response::Json, routing::get, Router};
use std::collections::HashMap;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::WebConfig;
pub use database::Database;
pub use error_handling::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: WebConfig,
}

impl AppState {
    pub async fn new(config: WebConfig) -> anyhow::Result<Self> {
        let db = Database::new(&config.database_url).await?;
        db.migrate().await?;
        Ok(Self { db, config })
    }
}

pub fn create_app(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .fallback(error_handling::handle_404)
        .layer(middleware::from_fn(error_handling::trace_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(max_upload_size))
        .with_state(state)
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<error_handling::HealthStatus> {
    let mut services = HashMap::new();
    services.insert(
        "database".to_string(),
        error_handling::check_database_health(state.db.pool()).await,
    );

    let status = if services.values().all(|s| s.status == "healthy") {
        "healthy"
    } else {
        "degraded"
    };

    Json(error_handling::HealthStatus {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
