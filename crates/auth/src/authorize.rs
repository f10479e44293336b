use thiserror::Error;

use crate::{Permission, Principal, RoleKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
///
/// Admins pass unconditionally; everyone else needs the permission in their
/// embedded set. The set travels with the token, so a stale token keeps its
/// grants until it expires.
pub fn authorize(principal: &Principal, required: Permission) -> Result<(), AuthzError> {
    if principal.role == RoleKind::Admin {
        return Ok(());
    }

    if principal.permissions.contains(&required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devplan_core::UserId;

    #[test]
    fn employee_can_create_tasks() {
        let p = Principal::new(UserId::new(), RoleKind::Employee);
        assert!(authorize(&p, Permission::CreateTasks).is_ok());
    }

    #[test]
    fn guest_denied_task_creation() {
        let p = Principal::new(UserId::new(), RoleKind::Guest);
        let err = authorize(&p, Permission::CreateTasks).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden(Permission::CreateTasks));
    }

    #[test]
    fn admin_passes_even_with_empty_permission_list() {
        let p = Principal {
            user_id: UserId::new(),
            role: RoleKind::Admin,
            permissions: Vec::new(),
        };
        assert!(authorize(&p, Permission::ManageUsers).is_ok());
    }
}
