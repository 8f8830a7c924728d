//! `postboard-auth`: authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: callers hand it
//! raw bearer tokens and ownership records, and get back typed identities or
//! typed rejections.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod password;
pub mod token;

pub use authorize::{
    AccessError, AccessGuard, GateOutcome, Rejection, check_ownership, is_permitted, require_role,
};
pub use claims::{IdentityClaims, TokenClaims, TokenValidationError, validate_claims};
pub use config::{ConfigError, DEFAULT_TOKEN_TTL, TokenConfig, parse_ttl};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use postboard_core::Role;
pub use token::{Hs256TokenService, TokenError, TokenIssuer, TokenValidator};
