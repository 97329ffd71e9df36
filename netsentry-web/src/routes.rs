use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/dashboard", get(handlers::dashboard::get_dashboard))
        // Alerts
        .route(
            "/alerts",
            get(handlers::alerts::list_alerts).post(handlers::alerts::create_alert),
        )
        .route(
            "/alerts/:id",
            get(handlers::alerts::get_alert)
                .put(handlers::alerts::update_alert)
                .delete(handlers::alerts::delete_alert),
        )
        .route("/alerts/:id/assign", post(handlers::alerts::assign_alert))
        // Network logs
        .route(
            "/network-logs",
            get(handlers::network_logs::list_logs).post(handlers::network_logs::upload_log),
        )
        .route(
            "/network-logs/:id",
            get(handlers::network_logs::get_log)
                .patch(handlers::network_logs::update_log_status)
                .delete(handlers::network_logs::delete_log),
        )
        // ML models
        .route(
            "/ml-models",
            get(handlers::ml_models::list_models).post(handlers::ml_models::create_model),
        )
        .route(
            "/ml-models/:id",
            get(handlers::ml_models::get_model)
                .put(handlers::ml_models::update_model)
                .delete(handlers::ml_models::delete_model),
        )
        // Users and preferences
        .route("/users", post(handlers::users::create_user))
        .route("/users/:id", get(handlers::users::get_user))
        .route(
            "/users/:id/preferences",
            get(handlers::users::get_preferences).patch(handlers::users::update_preferences),
        )
        // Notification inbox
        .route(
            "/users/:id/notifications",
            get(handlers::notifications::list_notifications)
                .delete(handlers::notifications::delete_all_notifications),
        )
        .route(
            "/users/:id/notifications/recent",
            get(handlers::notifications::recent_notifications),
        )
        .route(
            "/users/:id/notifications/read-all",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/users/:id/notifications/:notification_id/read",
            post(handlers::notifications::mark_read),
        )
        .route(
            "/users/:id/notifications/:notification_id",
            delete(handlers::notifications::delete_notification),
        )
}
