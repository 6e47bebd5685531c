use std::any::Any;

use crate::authentication::Authentication;

/// Answers fine-grained "may this principal do X to that object" questions.
pub trait PermissionEvaluator: Send + Sync {
    /// Checks `permission` against a domain object.
    fn has_permission(&self, authentication: &Authentication, target: &dyn Any, permission: &str) -> bool;

    /// Checks `permission` against an object known only by identifier and type.
    fn has_permission_by_id(
        &self,
        authentication: &Authentication,
        target_id: &str,
        target_type: &str,
        permission: &str,
    ) -> bool;
}

/// Refuses every permission check.
///
/// Installed as the fallback so a missing evaluator fails closed; each call
/// logs a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllPermissionEvaluator;

impl PermissionEvaluator for DenyAllPermissionEvaluator {
    fn has_permission(&self, authentication: &Authentication, _target: &dyn Any, permission: &str) -> bool {
        tracing::warn!(
            principal = %authentication.name(),
            permission,
            "Denying permission check; configure a PermissionEvaluator to allow it"
        );
        false
    }

    fn has_permission_by_id(
        &self,
        authentication: &Authentication,
        target_id: &str,
        target_type: &str,
        permission: &str,
    ) -> bool {
        tracing::warn!(
            principal = %authentication.name(),
            target_id,
            target_type,
            permission,
            "Denying permission check; configure a PermissionEvaluator to allow it"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_all_denies_objects_and_ids() {
        let evaluator = DenyAllPermissionEvaluator;
        let admin = Authentication::new("admin", "pw", ["ROLE_ADMIN"]);

        assert!(!evaluator.has_permission(&admin, &"document", "read"));
        assert!(!evaluator.has_permission_by_id(&admin, "42", "Document", "write"));
    }
}
