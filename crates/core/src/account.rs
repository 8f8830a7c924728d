//! Account model (the `users` resource).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, DomainError, DomainResult, Role};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A stored account.
///
/// The password hash never leaves the process: it is skipped when serializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Apply a validated patch, bumping `updated_at`.
    pub fn apply(&mut self, patch: AccountPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
        self.updated_at = now;
    }
}

/// Input for creating an account. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial update for an account. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

pub fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    Ok(())
}

/// Shallow email check: one `@` with something on both sides and a dot in the domain.
pub fn validate_email(email: &str) -> DomainResult<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(DomainError::validation(format!("invalid email '{email}'")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
