//! Token configuration loaded once at process start.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid duration '{0}' (expected e.g. 3600, 30s, 15m, 1h, 7d)")]
    InvalidDuration(String),
}

/// Signing secret plus token time-to-live.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }
        if ttl.is_zero() {
            return Err(ConfigError::InvalidDuration("0".to_string()));
        }
        Ok(Self { secret, ttl })
    }

    /// Read `JWT_SECRET` (required) and `JWT_EXPIRES_IN` (default one hour).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let ttl = match lookup("JWT_EXPIRES_IN") {
            Some(raw) if !raw.trim().is_empty() => parse_ttl(&raw)?,
            _ => DEFAULT_TOKEN_TTL,
        };
        Self::new(secret.trim().as_bytes().to_vec(), ttl)
    }
}

/// Parse a duration like `3600`, `30s`, `15m`, `1h` or `7d`.
pub fn parse_ttl(raw: &str) -> Result<Duration, ConfigError> {
    let raw = raw.trim();
    let invalid = || ConfigError::InvalidDuration(raw.to_string());

    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    let secs = value.checked_mul(multiplier).ok_or_else(invalid)?;
    if secs == 0 {
        return Err(invalid());
    }
    Ok(Duration::from_secs(secs))
}
