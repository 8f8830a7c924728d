use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use postboard_core::{AccountId, Role};

/// Identity carried by a session token (transport-agnostic).
///
/// Created at login from the stored account and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject: the account the token was issued to.
    pub id: AccountId,

    pub email: String,

    pub role: Role,
}

impl IdentityClaims {
    pub fn new(id: AccountId, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Full signed payload: identity plus the validity window (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaims,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,
}

/// Deterministically validate the expiry of decoded claims.
///
/// Only `exp` decides; `iat` is informational. Signature verification happens
/// in the token service before this is called.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if now.timestamp() >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> TokenClaims {
        TokenClaims {
            identity: IdentityClaims::new(AccountId::new(1), "a@b.io", Role::User),
            iat,
            exp,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn expiry_is_exclusive() {
        let c = claims(100, 200);
        assert_eq!(validate_claims(&c, at(100)), Ok(()));
        assert_eq!(validate_claims(&c, at(199)), Ok(()));
        assert_eq!(validate_claims(&c, at(200)), Err(TokenValidationError::Expired));
    }

    #[test]
    fn issued_at_in_the_future_is_still_valid() {
        assert_eq!(validate_claims(&claims(130, 200), at(100)), Ok(()));
        assert_eq!(validate_claims(&claims(200, 200), at(199)), Ok(()));
    }

    #[test]
    fn payload_is_flat() {
        let json = serde_json::to_value(claims(1, 2)).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["email"], "a@b.io");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["exp"], 2);
    }
}
