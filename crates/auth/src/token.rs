//! Session token issuance and verification (HS256 JWT).

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{IdentityClaims, TokenClaims, validate_claims};
use crate::config::TokenConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed input, bad signature or elapsed expiry. Deliberately opaque.
    #[error("invalid token")]
    InvalidToken,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Verifies bearer tokens and yields the embedded identity.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError>;
}

/// Signs identity claims into bearer tokens.
pub trait TokenIssuer: Send + Sync {
    fn issue_at(&self, claims: &IdentityClaims, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn issue(&self, claims: &IdentityClaims) -> Result<String, TokenError> {
        self.issue_at(claims, Utc::now())
    }

    fn ttl(&self) -> Duration;
}

/// Stateless HS256 token service keyed by a single signing secret.
pub struct Hs256TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller-supplied clock in `validate_claims`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            ttl: config.ttl,
        }
    }
}

impl TokenIssuer for Hs256TokenService {
    fn issue_at(&self, claims: &IdentityClaims, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let payload = TokenClaims {
            identity: claims.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "token rejected");
            TokenError::InvalidToken
        })?;

        validate_claims(&data.claims, now).map_err(|e| {
            tracing::debug!(reason = %e, "token rejected");
            TokenError::InvalidToken
        })?;

        Ok(data.claims.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOKEN_TTL;
    use postboard_core::{AccountId, Role};
    use proptest::prelude::*;

    fn service(secret: &str) -> Hs256TokenService {
        Hs256TokenService::new(&TokenConfig::new(secret, DEFAULT_TOKEN_TTL).unwrap())
    }

    fn alice() -> IdentityClaims {
        IdentityClaims::new(AccountId::new(1), "alice@example.com", Role::User)
    }

    #[test]
    fn issued_token_verifies_to_same_claims() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue_at(&alice(), now).unwrap();
        assert_eq!(svc.validate(&token, now).unwrap(), alice());
    }

    #[test]
    fn expired_token_is_invalid() {
        let svc = service("test-secret");
        let issued = Utc::now() - chrono::Duration::hours(2);
        let token = svc.issue_at(&alice(), issued).unwrap();
        assert_eq!(svc.validate(&token, Utc::now()), Err(TokenError::InvalidToken));
    }

    #[test]
    fn token_is_invalid_exactly_at_expiry() {
        let svc = service("test-secret");
        let issued = Utc::now();
        let token = svc.issue_at(&alice(), issued).unwrap();
        let at_expiry = issued + chrono::Duration::seconds(DEFAULT_TOKEN_TTL.as_secs() as i64);
        assert_eq!(svc.validate(&token, at_expiry), Err(TokenError::InvalidToken));
    }

    #[test]
    fn token_issued_ahead_of_local_clock_verifies() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue_at(&alice(), now + chrono::Duration::seconds(30)).unwrap();
        assert_eq!(svc.validate(&token, now), Ok(alice()));
    }

    #[test]
    fn expired_token_with_foreign_signature_is_invalid() {
        let issued = Utc::now() - chrono::Duration::hours(3);
        let token = service("other-secret").issue_at(&alice(), issued).unwrap();
        assert_eq!(
            service("test-secret").validate(&token, Utc::now()),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let token = service("other-secret").issue(&alice()).unwrap();
        assert_eq!(
            service("test-secret").validate(&token, Utc::now()),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let svc = service("test-secret");
        let token = svc.issue(&alice()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = svc
            .issue(&IdentityClaims::new(AccountId::new(1), "alice@example.com", Role::Admin))
            .unwrap();
        // Splice the admin payload under the original signature.
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        assert_eq!(svc.validate(&parts.join("."), Utc::now()), Err(TokenError::InvalidToken));
    }

    #[test]
    fn garbage_is_invalid() {
        let svc = service("test-secret");
        for token in ["", "abc", "a.b.c", "Bearer x"] {
            assert_eq!(svc.validate(token, Utc::now()), Err(TokenError::InvalidToken));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: any identity survives issue -> validate before expiry.
        #[test]
        fn issue_then_validate_round_trips(
            id in 1i64..i64::MAX,
            local in "[a-z0-9]{1,16}",
            admin in any::<bool>(),
            elapsed in 0i64..3600,
        ) {
            let svc = service("prop-secret");
            let role = if admin { Role::Admin } else { Role::User };
            let claims = IdentityClaims::new(AccountId::new(id), format!("{local}@example.com"), role);
            let issued = Utc::now();
            let token = svc.issue_at(&claims, issued).unwrap();
            let checked = svc.validate(&token, issued + chrono::Duration::seconds(elapsed)).unwrap();
            prop_assert_eq!(checked, claims);
        }
    }
}
