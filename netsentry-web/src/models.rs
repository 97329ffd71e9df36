use chrono::{DateTime, Utc};
use netsentry_core::NotificationPayload;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, role: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            role,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user notification preferences. One row per user, created alongside
/// the user and lazily materialized with defaults if it ever goes missing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    pub id: String,
    pub user_id: String,
    pub email_alerts: bool,
    pub browser_notifications: bool,
    pub sound_notifications: bool,
    pub critical_alerts_only: bool,
    /// JSON array of subscribed severity strings.
    pub alert_types: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    pub fn defaults_for(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            email_alerts: true,
            browser_notifications: true,
            sound_notifications: true,
            critical_alerts_only: false,
            alert_types: r#"["critical","high","medium","low"]"#.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn alert_types_vec(&self) -> Vec<String> {
        serde_json::from_str(&self.alert_types).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NetworkLog {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    /// Storage-relative path under the configured upload directory.
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub status: String,
    pub analysis_result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NetworkLog {
    pub fn new(user_id: String, file_name: String, file_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            file_name,
            file_path,
            upload_date: now,
            status: "pending".to_string(),
            analysis_result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MlModel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub trained_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MlModel {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            file_path: None,
            trained_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: String,
    pub network_log_id: String,
    pub ml_model_id: String,
    pub attack_type: String,
    pub severity: String,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub confidence_score: Option<f64>,
    pub status: String,
    pub detected_at: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        network_log_id: String,
        ml_model_id: String,
        attack_type: String,
        severity: String,
        source_ip: Option<String>,
        destination_ip: Option<String>,
        confidence_score: Option<f64>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            network_log_id,
            ml_model_id,
            attack_type,
            severity,
            source_ip,
            destination_ip,
            confidence_score,
            status: "new".to_string(),
            detected_at: now,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted notification row; the notifications table is the delivery
/// channel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub icon: String,
    pub color: String,
    pub action_url: Option<String>,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn from_payload(user_id: &str, payload: &NotificationPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind: payload.kind.as_str().to_string(),
            title: payload.title.clone(),
            message: payload.message.clone(),
            severity: payload.severity.clone(),
            icon: payload.icon.clone(),
            color: payload.color.clone(),
            action_url: payload.action_url.clone(),
            priority: payload.priority.clone(),
            created_at: Utc::now(),
            read_at: None,
        }
    }
}

/// Inbox projection of a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub icon: String,
    pub color: String,
    pub action_url: Option<String>,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub is_read: bool,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        let is_read = n.read_at.is_some();
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            severity: n.severity,
            icon: n.icon,
            color: n.color,
            action_url: n.action_url,
            priority: n.priority,
            created_at: n.created_at,
            read_at: n.read_at,
            is_read,
        }
    }
}

// Request / response DTOs

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAlertRequest {
    pub network_log_id: String,
    pub ml_model_id: String,
    pub attack_type: String,
    pub severity: String,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub confidence_score: Option<f64>,
    pub description: Option<String>,
    /// The user performing the action, when known. Session handling lives
    /// outside this service.
    pub acting_user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateAlertRequest {
    pub network_log_id: String,
    pub ml_model_id: String,
    pub attack_type: String,
    pub severity: String,
    pub status: Option<String>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
    pub confidence_score: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssignAlertRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateLogStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateModelRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub email_alerts: Option<bool>,
    pub browser_notifications: Option<bool>,
    pub sound_notifications: Option<bool>,
    pub critical_alerts_only: Option<bool>,
    pub alert_types: Option<Vec<String>>,
}

/// Alert row joined with its log file name and model name for listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AlertListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub alert: Alert,
    pub file_name: Option<String>,
    pub model_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<AlertListItem>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct NetworkLogDetail {
    #[serde(flatten)]
    pub log: NetworkLog,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Serialize)]
pub struct RecentNotificationsResponse {
    pub notifications: Vec<NotificationView>,
    pub unread_count: i64,
}
