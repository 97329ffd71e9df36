// NetSentry Core Library
// Domain types and pure logic for network-security alert management

pub mod dashboard;
pub mod matrix;
pub mod notification;
pub mod role;
pub mod severity;

pub use dashboard::{
    AlertsOverTimePoint, AttackTypeCount, DashboardSnapshot, DashboardStats, RecentAlert, Series,
    SeverityCount, SystemHealth,
};
pub use matrix::eligible_roles;
pub use notification::{NotificationKind, NotificationPayload};
pub use role::Role;
pub use severity::{severity_color, severity_label, AlertStatus, LogStatus, Severity};
