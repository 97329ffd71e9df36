use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Static display value for average processing time; not computed from
/// stored data.
pub const AVG_PROCESSING_TIME: &str = "2.3s";

/// Basic entity counts shown at the top of the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_logs: i64,
    pub total_alerts: i64,
    pub critical_alerts: i64,
    pub pending_logs: i64,
    pub active_models: i64,
    pub total_users: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTypeCount {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsOverTimePoint {
    pub date: String,
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: String,
    pub count: i64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub models_active: i64,
    pub logs_processed_today: i64,
    pub alerts_today: i64,
    pub avg_processing_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentAlert {
    pub id: String,
    pub attack_type: String,
    pub severity: String,
    pub detected_at: String,
    pub description: Option<String>,
    pub model_name: String,
}

/// A chart series that may have been substituted with demo data.
///
/// Charts never render empty: when the backing query returns no rows the
/// fixed placeholder series is served instead, flagged so consumers can
/// visually distinguish demo data from real data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<T> {
    pub data: Vec<T>,
    pub is_placeholder: bool,
}

impl<T> Series<T> {
    pub fn real(data: Vec<T>) -> Self {
        Self {
            data,
            is_placeholder: false,
        }
    }

    pub fn placeholder(data: Vec<T>) -> Self {
        Self {
            data,
            is_placeholder: true,
        }
    }
}

/// The full dashboard snapshot. All groups are computed independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub attack_type_distribution: Series<AttackTypeCount>,
    pub alerts_over_time: Series<AlertsOverTimePoint>,
    pub severity_distribution: Series<SeverityCount>,
    pub system_health: SystemHealth,
    pub recent_alerts: Vec<RecentAlert>,
}

/// Fixed demo attack-type distribution.
pub fn placeholder_attack_types() -> Vec<AttackTypeCount> {
    [
        ("DDoS", 15),
        ("Port Scan", 12),
        ("SQL Injection", 8),
        ("XSS", 5),
        ("Brute Force", 10),
    ]
    .into_iter()
    .map(|(name, value)| AttackTypeCount {
        name: name.to_string(),
        value,
    })
    .collect()
}

/// Label for one calendar day in the alerts-over-time series.
pub fn day_point(date: NaiveDate, count: i64) -> AlertsOverTimePoint {
    AlertsOverTimePoint {
        date: date.format("%Y-%m-%d").to_string(),
        day: date.format("%b %d").to_string(),
        count,
    }
}

/// The 7 calendar days ending on `today`, oldest first.
pub fn last_seven_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .rev()
        .map(|offset| today - chrono::Duration::days(offset))
        .collect()
}

/// Fixed demo alerts-over-time series, labeled with the real 7-day window.
pub fn placeholder_alerts_over_time(today: NaiveDate) -> Vec<AlertsOverTimePoint> {
    const DEMO_COUNTS: [i64; 7] = [5, 8, 12, 7, 15, 10, 6];
    last_seven_days(today)
        .into_iter()
        .zip(DEMO_COUNTS)
        .map(|(date, count)| day_point(date, count))
        .collect()
}

/// Fixed demo severity distribution with canonical colors.
pub fn placeholder_severity_distribution() -> Vec<SeverityCount> {
    [
        (Severity::Critical, 5),
        (Severity::High, 12),
        (Severity::Medium, 18),
        (Severity::Low, 8),
    ]
    .into_iter()
    .map(|(severity, count)| SeverityCount {
        severity: severity.label().to_string(),
        count,
        color: severity.color().to_string(),
    })
    .collect()
}
