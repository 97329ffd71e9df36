use crate::severity::{severity_color, Severity};
use serde::{Deserialize, Serialize};

/// The two notification payload kinds the dispatcher emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AlertCreated,
    CriticalThreatDetected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AlertCreated => "alert_created",
            NotificationKind::CriticalThreatDetected => "critical_threat_detected",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification payload handed to the delivery channel.
///
/// Shape matches what the inbox projection serves back out: type, title,
/// message, severity, icon, color, optional action URL and priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub severity: String,
    pub icon: String,
    pub color: String,
    pub action_url: Option<String>,
    pub priority: String,
}

impl NotificationPayload {
    /// Standard payload for a newly created alert.
    pub fn alert_created(alert_id: &str, attack_type: &str, severity: &str) -> Self {
        let parsed = severity.parse::<Severity>().ok();
        let icon = match parsed {
            Some(Severity::Critical) => "🚨",
            Some(Severity::High) => "⚠️",
            Some(Severity::Medium) => "🔔",
            Some(Severity::Low) => "ℹ️",
            None => "📄",
        };
        let priority = match parsed {
            Some(Severity::Critical) | Some(Severity::High) => "high",
            _ => "normal",
        };

        Self {
            kind: NotificationKind::AlertCreated,
            title: "New Security Alert".to_string(),
            message: format!("{} attack detected with {} severity", attack_type, severity),
            severity: severity.to_string(),
            icon: icon.to_string(),
            color: severity_color(severity).to_string(),
            action_url: Some(format!("/alerts/{}", alert_id)),
            priority: priority.to_string(),
        }
    }

    /// Dedicated payload for the Admin/Analyst critical-threat broadcast.
    /// Sent in addition to the standard payload by design.
    pub fn critical_threat(alert_id: &str, attack_type: &str) -> Self {
        Self {
            kind: NotificationKind::CriticalThreatDetected,
            title: "Critical Threat Detected".to_string(),
            message: format!(
                "Critical {} attack detected. Immediate attention required.",
                attack_type
            ),
            severity: Severity::Critical.to_string(),
            icon: "🚨".to_string(),
            color: Severity::Critical.color().to_string(),
            action_url: Some(format!("/alerts/{}", alert_id)),
            priority: "critical".to_string(),
        }
    }
}
