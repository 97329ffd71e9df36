use crate::role::Role;
use crate::severity::Severity;

/// Role-notification matrix: which roles receive the standard
/// alert-created notification for a given severity.
///
/// `None` covers severities that failed to parse; those distribute to
/// admins only, same as `low`.
pub fn eligible_roles(severity: Option<Severity>) -> &'static [Role] {
    const ADMIN_AND_ANALYST: &[Role] = &[Role::Admin, Role::Analyst];
    const ADMIN_ONLY: &[Role] = &[Role::Admin];

    match severity {
        Some(Severity::Critical) | Some(Severity::High) | Some(Severity::Medium) => {
            ADMIN_AND_ANALYST
        }
        Some(Severity::Low) => ADMIN_ONLY,
        None => ADMIN_ONLY,
    }
}
