use serde::{Deserialize, Serialize};

/// Platform permission.
///
/// The permission set is closed and known at compile time; roles grant static
/// subsets of it (see [`crate::RoleKind`]). Authorization is a plain set
/// membership check over these variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewTasks,
    CreateTasks,
    UpdateTasks,
    DeleteTasks,

    ViewTemplates,
    CreateTemplates,
    PublishTemplates,
    DeleteTemplates,

    ViewUsers,
    ManageUsers,
    ApproveUsers,
    AssignRoles,

    ViewReports,
    ManageWorkflows,
    RunQualityChecks,
}

impl Permission {
    /// Every permission the platform knows about.
    pub const ALL: &'static [Permission] = &[
        Permission::ViewTasks,
        Permission::CreateTasks,
        Permission::UpdateTasks,
        Permission::DeleteTasks,
        Permission::ViewTemplates,
        Permission::CreateTemplates,
        Permission::PublishTemplates,
        Permission::DeleteTemplates,
        Permission::ViewUsers,
        Permission::ManageUsers,
        Permission::ApproveUsers,
        Permission::AssignRoles,
        Permission::ViewReports,
        Permission::ManageWorkflows,
        Permission::RunQualityChecks,
    ];

    /// Stable wire name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewTasks => "view_tasks",
            Permission::CreateTasks => "create_tasks",
            Permission::UpdateTasks => "update_tasks",
            Permission::DeleteTasks => "delete_tasks",
            Permission::ViewTemplates => "view_templates",
            Permission::CreateTemplates => "create_templates",
            Permission::PublishTemplates => "publish_templates",
            Permission::DeleteTemplates => "delete_templates",
            Permission::ViewUsers => "view_users",
            Permission::ManageUsers => "manage_users",
            Permission::ApproveUsers => "approve_users",
            Permission::AssignRoles => "assign_roles",
            Permission::ViewReports => "view_reports",
            Permission::ManageWorkflows => "manage_workflows",
            Permission::RunQualityChecks => "run_quality_checks",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_exhaustive_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for p in Permission::ALL {
            assert!(seen.insert(*p), "duplicate permission in ALL: {p}");
        }
        assert_eq!(seen.len(), Permission::ALL.len());
    }

    #[test]
    fn wire_names_round_trip() {
        for p in Permission::ALL {
            let json = serde_json::to_string(p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
            let back: Permission = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *p);
        }
    }
}
