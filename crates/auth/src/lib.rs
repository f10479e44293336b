//! `devplan-auth` — pure authentication/authorization boundary.
//!
//! Role/permission model, access-token claims and the HMAC token service.
//! Intentionally decoupled from HTTP and storage: transports hand raw tokens
//! in, fully-resolved principals come out.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_window, AccessClaims, TokenValidationError};
pub use password::{Argon2Hasher, PasswordHasher};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::{RoleKind, UserRole};
pub use token::{HmacTokenService, TokenError, TokenService};
