use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use devplan_core::UserId;

use crate::Permission;

/// Role granted to a user.
///
/// Permission grants are static and strictly nested: every permission a Guest
/// holds an Employee holds too, and so on up to Manager. Admin passes every
/// permission check (full access). The `Ord` derive follows declaration
/// order, so `Guest < Employee < Manager < Admin` and role comparisons can
/// back privilege-escalation guards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Guest,
    Employee,
    Manager,
    Admin,
}

const GUEST_PERMISSIONS: &[Permission] = &[Permission::ViewTasks, Permission::ViewTemplates];

const EMPLOYEE_PERMISSIONS: &[Permission] = &[
    Permission::ViewTasks,
    Permission::ViewTemplates,
    Permission::CreateTasks,
    Permission::UpdateTasks,
    Permission::CreateTemplates,
    Permission::ViewUsers,
    Permission::RunQualityChecks,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ViewTasks,
    Permission::ViewTemplates,
    Permission::CreateTasks,
    Permission::UpdateTasks,
    Permission::CreateTemplates,
    Permission::ViewUsers,
    Permission::RunQualityChecks,
    Permission::DeleteTasks,
    Permission::PublishTemplates,
    Permission::DeleteTemplates,
    Permission::ApproveUsers,
    Permission::AssignRoles,
    Permission::ViewReports,
    Permission::ManageWorkflows,
];

impl RoleKind {
    /// Static permission set granted by this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            RoleKind::Guest => GUEST_PERMISSIONS,
            RoleKind::Employee => EMPLOYEE_PERMISSIONS,
            RoleKind::Manager => MANAGER_PERMISSIONS,
            RoleKind::Admin => Permission::ALL,
        }
    }

    /// Set membership check; Admin always passes.
    pub fn grants(&self, permission: Permission) -> bool {
        matches!(self, RoleKind::Admin) || self.permissions().contains(&permission)
    }

    /// Stable wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Guest => "guest",
            RoleKind::Employee => "employee",
            RoleKind::Manager => "manager",
            RoleKind::Admin => "admin",
        }
    }
}

impl core::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role assignment with its audit metadata.
///
/// `assigned_by` is `None` for roles granted by the system itself (e.g. the
/// initial Guest role at registration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub kind: RoleKind,
    pub assigned_at: DateTime<Utc>,
    pub assigned_by: Option<UserId>,
}

impl UserRole {
    pub fn new(kind: RoleKind, assigned_at: DateTime<Utc>, assigned_by: Option<UserId>) -> Self {
        Self {
            kind,
            assigned_at,
            assigned_by,
        }
    }

    /// System-granted role (no assigning actor).
    pub fn system(kind: RoleKind, assigned_at: DateTime<Utc>) -> Self {
        Self::new(kind, assigned_at, None)
    }
}

impl devplan_core::ValueObject for UserRole {}
