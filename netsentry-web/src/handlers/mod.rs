pub mod alerts;
pub mod dashboard;
pub mod ml_models;
pub mod network_logs;
pub mod notifications;
pub mod users;
