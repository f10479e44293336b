use serde::{Deserialize, Serialize};

use devplan_core::UserId;

use crate::{AccessClaims, Permission, RoleKind};

/// A fully resolved principal for authorization decisions.
///
/// Construction is decoupled from transport: the API layer derives a principal
/// from verified token claims, workers can construct one directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: RoleKind,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(user_id: UserId, role: RoleKind) -> Self {
        Self {
            user_id,
            role,
            permissions: role.permissions().to_vec(),
        }
    }
}

impl From<&AccessClaims> for Principal {
    fn from(claims: &AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            permissions: claims.permissions.clone(),
        }
    }
}
