//! Access-token issuance and verification (HS256, shared secret).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use devplan_core::UserId;

use crate::claims::{validate_window, AccessClaims, TokenValidationError};
use crate::RoleKind;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("failed to verify token: {0}")]
    Verification(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    InvalidClaims(#[from] TokenValidationError),

    #[error("token lifetime must be positive")]
    NonPositiveLifetime,
}

/// Token issuance/verification contract.
///
/// `now` is passed in explicitly so expiry behaviour stays deterministic in
/// tests; callers use `Utc::now()` in production.
pub trait TokenService: Send + Sync {
    /// Sign an access token for a user holding `role`.
    fn issue(&self, user_id: UserId, role: RoleKind, now: DateTime<Utc>)
        -> Result<String, TokenError>;

    /// Verify signature and claims window, returning the decoded claims.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError>;
}

/// HS256 token service backed by a shared secret.
///
/// The role and its effective permission set are embedded in the claims at
/// issuance, so resource services can authorize without calling back here.
pub struct HmacTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl core::fmt::Debug for HmacTokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacTokenService")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl HmacTokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, TokenError> {
        if lifetime <= Duration::zero() {
            return Err(TokenError::NonPositiveLifetime);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        })
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked deterministically via `validate_window`
        // against the caller-supplied clock, not the library's wall clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl TokenService for HmacTokenService {
    fn issue(
        &self,
        user_id: UserId,
        role: RoleKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims {
            sub: user_id,
            role,
            permissions: role.permissions().to_vec(),
            iat: now,
            exp: now + self.lifetime,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessClaims, TokenError> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(TokenError::Verification)?;

        validate_window(&data.claims, now)?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Permission;

    fn service() -> HmacTokenService {
        HmacTokenService::new(b"test-secret-do-not-use", Duration::hours(1)).unwrap()
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let svc = service();
        let user_id = UserId::new();
        let now = Utc::now();

        let token = svc.issue(user_id, RoleKind::Manager, now).unwrap();
        let claims = svc.verify(&token, now).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, RoleKind::Manager);
        assert!(claims.permissions.contains(&Permission::ApproveUsers));
        assert!(!claims.permissions.contains(&Permission::ManageUsers));
    }

    #[test]
    fn expired_token_rejected() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(2);

        let token = svc.issue(UserId::new(), RoleKind::Guest, issued).unwrap();
        let err = svc.verify(&token, Utc::now()).unwrap_err();

        assert!(matches!(
            err,
            TokenError::InvalidClaims(TokenValidationError::Expired)
        ));
    }

    #[test]
    fn tampered_token_rejected() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue(UserId::new(), RoleKind::Guest, now).unwrap();

        // Flip the first character of the signature segment.
        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.starts_with('A') { "B" } else { "A" };
        let tampered = format!("{head}.{flipped}{}", &sig[1..]);

        assert!(matches!(
            svc.verify(&tampered, now),
            Err(TokenError::Verification(_))
        ));
    }

    #[test]
    fn wrong_secret_rejected() {
        let now = Utc::now();
        let token = service().issue(UserId::new(), RoleKind::Admin, now).unwrap();

        let other = HmacTokenService::new(b"another-secret", Duration::hours(1)).unwrap();
        assert!(matches!(
            other.verify(&token, now),
            Err(TokenError::Verification(_))
        ));
    }

    #[test]
    fn zero_lifetime_rejected_at_construction() {
        let err = HmacTokenService::new(b"secret", Duration::zero()).unwrap_err();
        assert!(matches!(err, TokenError::NonPositiveLifetime));
    }
}
