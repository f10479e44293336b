use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use devplan_core::UserId;

use crate::{Permission, RoleKind};

/// Access-token claims model (transport-agnostic).
///
/// The role and its effective permission set are embedded so downstream
/// services can authorize without a directory lookup. Timestamps serialize as
/// unix seconds, which is what JWT libraries expect for `iat`/`exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Role held by the user at issuance time.
    pub role: RoleKind,

    /// Effective permissions derived from the role.
    pub permissions: Vec<Permission>,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claims time window.
///
/// This validates the *claims* only; signature verification lives in the
/// token service. Keeping the window check pure makes expiry behaviour
/// testable without clocks or keys.
pub fn validate_window(
    claims: &AccessClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(iat: DateTime<Utc>, exp: DateTime<Utc>) -> AccessClaims {
        AccessClaims {
            sub: UserId::new(),
            role: RoleKind::Employee,
            permissions: RoleKind::Employee.permissions().to_vec(),
            iat,
            exp,
        }
    }

    #[test]
    fn accepts_token_within_window() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(5), now + Duration::minutes(5));
        assert!(validate_window(&c, now).is_ok());
    }

    #[test]
    fn rejects_expired_token() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(2), now - Duration::hours(1));
        assert_eq!(validate_window(&c, now), Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_future_token() {
        let now = Utc::now();
        let c = claims(now + Duration::minutes(1), now + Duration::hours(1));
        assert_eq!(
            validate_window(&c, now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn rejects_inverted_window() {
        let now = Utc::now();
        let c = claims(now, now);
        assert_eq!(
            validate_window(&c, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
