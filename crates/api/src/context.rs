use postboard_auth::IdentityClaims;
use postboard_core::AccountId;

/// Authenticated caller for the current request.
///
/// Inserted by the auth middleware; only present on gated routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    claims: IdentityClaims,
}

impl IdentityContext {
    pub fn new(claims: IdentityClaims) -> Self {
        Self { claims }
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.id
    }

    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }
}
