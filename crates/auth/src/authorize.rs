use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use postboard_core::{AccountId, Role};

use crate::claims::IdentityClaims;
use crate::token::TokenValidator;

/// Why a gated operation was refused.
///
/// Every variant is a recovered, per-request outcome; none of them should
/// escape the request that produced it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// Missing, malformed, tampered or expired token.
    #[error("unauthenticated")]
    InvalidToken,

    #[error("forbidden: role not permitted")]
    RoleMismatch,

    #[error("forbidden: not the resource owner")]
    OwnershipMismatch,

    /// The resource whose ownership was requested does not exist.
    #[error("resource not found")]
    ResourceAbsent,
}

/// Transport-neutral rejection classes. The HTTP layer maps them to 401/403/404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated,
    Forbidden,
    NotFound,
}

impl AccessError {
    pub fn rejection(&self) -> Rejection {
        match self {
            AccessError::InvalidToken => Rejection::Unauthenticated,
            AccessError::RoleMismatch | AccessError::OwnershipMismatch => Rejection::Forbidden,
            AccessError::ResourceAbsent => Rejection::NotFound,
        }
    }
}

/// Result of running the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Proceed(IdentityClaims),
    Reject(Rejection),
}

impl From<Result<IdentityClaims, AccessError>> for GateOutcome {
    fn from(value: Result<IdentityClaims, AccessError>) -> Self {
        match value {
            Ok(identity) => GateOutcome::Proceed(identity),
            Err(e) => GateOutcome::Reject(e.rejection()),
        }
    }
}

/// Request gate: authenticates bearer tokens and checks roles.
///
/// - No IO
/// - No caching: every call verifies the token again
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<dyn TokenValidator>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<dyn TokenValidator>) -> Self {
        Self { tokens }
    }

    /// Require a valid token and return the identity it carries.
    pub fn authenticate(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<IdentityClaims, AccessError> {
        let token = token.ok_or(AccessError::InvalidToken)?;
        self.tokens
            .validate(token, now)
            .map_err(|_| AccessError::InvalidToken)
    }

    /// Authenticate, then require the identity's role to be one of `allowed`.
    ///
    /// The token is verified exactly once.
    pub fn authorize(
        &self,
        token: Option<&str>,
        allowed: &[Role],
        now: DateTime<Utc>,
    ) -> Result<IdentityClaims, AccessError> {
        let identity = self.authenticate(token, now)?;
        require_role(&identity, allowed)?;
        Ok(identity)
    }

    /// Run the gate with an optional role requirement.
    pub fn gate(&self, token: Option<&str>, allowed: Option<&[Role]>, now: DateTime<Utc>) -> GateOutcome {
        match allowed {
            Some(roles) => self.authorize(token, roles, now).into(),
            None => self.authenticate(token, now).into(),
        }
    }
}

/// Check an already-authenticated identity against a role allow-list.
pub fn require_role(identity: &IdentityClaims, allowed: &[Role]) -> Result<(), AccessError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AccessError::RoleMismatch)
    }
}

/// Ownership policy: admins may act on anything, everyone else only on what they own.
pub fn is_permitted(identity: &IdentityClaims, owner: AccountId) -> bool {
    identity.is_admin() || identity.id == owner
}

/// Ownership check against the *current* ownership record.
///
/// `owner` is `None` when the resource does not exist; that is reported as
/// `ResourceAbsent` before any permission decision is made, so a missing
/// resource never reads as "forbidden".
pub fn check_ownership(identity: &IdentityClaims, owner: Option<AccountId>) -> Result<(), AccessError> {
    let owner = owner.ok_or(AccessError::ResourceAbsent)?;
    if is_permitted(identity, owner) {
        Ok(())
    } else {
        Err(AccessError::OwnershipMismatch)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::{DEFAULT_TOKEN_TTL, TokenConfig};
    use crate::token::{Hs256TokenService, TokenError, TokenIssuer};
    use proptest::prelude::*;

    /// Counts validations so tests can assert a single verification pass.
    struct CountingValidator {
        inner: Hs256TokenService,
        calls: AtomicUsize,
    }

    impl TokenValidator for CountingValidator {
        fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.validate(token, now)
        }
    }

    fn tokens() -> Hs256TokenService {
        Hs256TokenService::new(&TokenConfig::new("guard-secret", DEFAULT_TOKEN_TTL).unwrap())
    }

    fn identity(id: i64, role: Role) -> IdentityClaims {
        IdentityClaims::new(AccountId::new(id), format!("u{id}@example.com"), role)
    }

    fn guard() -> (AccessGuard, Arc<CountingValidator>) {
        let validator = Arc::new(CountingValidator {
            inner: tokens(),
            calls: AtomicUsize::new(0),
        });
        (AccessGuard::new(validator.clone()), validator)
    }

    #[test]
    fn missing_token_is_unauthenticated() {
        let (guard, _) = guard();
        assert_eq!(guard.authenticate(None, Utc::now()), Err(AccessError::InvalidToken));
        assert_eq!(
            guard.gate(None, None, Utc::now()),
            GateOutcome::Reject(Rejection::Unauthenticated)
        );
    }

    #[test]
    fn valid_token_yields_identity() {
        let (guard, _) = guard();
        let token = tokens().issue(&identity(4, Role::User)).unwrap();
        assert_eq!(
            guard.gate(Some(token.as_str()), None, Utc::now()),
            GateOutcome::Proceed(identity(4, Role::User))
        );
    }

    #[test]
    fn authorize_rejects_role_outside_allow_list() {
        let (guard, _) = guard();
        let token = tokens().issue(&identity(4, Role::User)).unwrap();
        assert_eq!(
            guard.authorize(Some(token.as_str()), &[Role::Admin], Utc::now()),
            Err(AccessError::RoleMismatch)
        );
        assert_eq!(
            guard.gate(Some(token.as_str()), Some(&[Role::Admin][..]), Utc::now()),
            GateOutcome::Reject(Rejection::Forbidden)
        );
    }

    #[test]
    fn authorize_with_bad_token_is_unauthenticated_not_forbidden() {
        let (guard, _) = guard();
        assert_eq!(
            guard.authorize(Some("nope"), &[Role::Admin], Utc::now()),
            Err(AccessError::InvalidToken)
        );
    }

    #[test]
    fn authorize_verifies_token_once() {
        let (guard, validator) = guard();
        let token = tokens().issue(&identity(1, Role::Admin)).unwrap();
        let id = guard.authorize(Some(token.as_str()), &[Role::Admin], Utc::now()).unwrap();
        assert!(id.is_admin());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decisions_are_not_cached_across_calls() {
        let (guard, validator) = guard();
        let token = tokens().issue(&identity(1, Role::User)).unwrap();
        for _ in 0..3 {
            guard.authenticate(Some(token.as_str()), Utc::now()).unwrap();
        }
        assert_eq!(validator.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn absent_resource_is_not_found_even_for_strangers() {
        let stranger = identity(2, Role::User);
        assert_eq!(check_ownership(&stranger, None), Err(AccessError::ResourceAbsent));
        assert_eq!(AccessError::ResourceAbsent.rejection(), Rejection::NotFound);
    }

    #[test]
    fn non_owner_is_forbidden_and_admin_is_allowed() {
        let owner = AccountId::new(1);
        assert_eq!(
            check_ownership(&identity(2, Role::User), Some(owner)),
            Err(AccessError::OwnershipMismatch)
        );
        assert_eq!(check_ownership(&identity(2, Role::Admin), Some(owner)), Ok(()));
        assert_eq!(check_ownership(&identity(1, Role::User), Some(owner)), Ok(()));
    }

    proptest! {
        /// Property: allowed iff ADMIN or requester id == owner id.
        #[test]
        fn ownership_decision_matches_policy(
            requester in 1i64..50,
            owner in 1i64..50,
            admin in any::<bool>(),
        ) {
            let role = if admin { Role::Admin } else { Role::User };
            let decision = check_ownership(&identity(requester, role), Some(AccountId::new(owner)));
            if admin || requester == owner {
                prop_assert_eq!(decision, Ok(()));
            } else {
                prop_assert_eq!(decision, Err(AccessError::OwnershipMismatch));
            }
        }
    }
}
