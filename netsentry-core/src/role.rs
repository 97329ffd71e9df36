use crate::severity::Severity;

/// Closed set of user roles.
///
/// The stored `role` column is free text; parsing funnels every value into
/// this enum so eligibility checks are capability calls instead of string
/// comparisons scattered through handlers. Unrecognized strings become
/// `Viewer`, which holds no notification capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Role {
    Admin,
    Analyst,
    Viewer,
}

impl Role {
    /// Parse a stored role string. Never fails; unknown values are viewers.
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "analyst" => Role::Analyst,
            _ => Role::Viewer,
        }
    }

    /// Whether this role is in the audience for the dedicated
    /// critical-threat broadcast.
    pub fn receives_critical_broadcast(&self) -> bool {
        matches!(self, Role::Admin | Role::Analyst)
    }

    /// Whether this role receives the standard alert-created notification
    /// for the given severity, per the role-notification matrix.
    pub fn receives_alerts_for(&self, severity: Option<Severity>) -> bool {
        crate::matrix::eligible_roles(severity).contains(self)
    }

    /// Canonical string form, matching the values stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Analyst => "Analyst",
            Role::Viewer => "Viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
