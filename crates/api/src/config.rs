//! Process configuration, read once at startup.

use std::net::SocketAddr;

use thiserror::Error;

use postboard_auth::{ConfigError, TokenConfig};
use postboard_events::DEFAULT_QUEUE_CAPACITY;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Token(#[from] ConfigError),

    #[error("invalid {key} '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together")]
    PartialSeed,
}

/// Credentials for an admin account provisioned at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub token: TokenConfig,
    pub bind_addr: SocketAddr,
    pub hub_queue_capacity: usize,
    pub seed_admin: Option<SeedAdmin>,
}

impl ApiConfig {
    /// Config with defaults for everything but the token settings.
    pub fn new(token: TokenConfig) -> Self {
        Self {
            token,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            hub_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            seed_admin: None,
        }
    }

    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = TokenConfig::from_lookup(&lookup)?;
        let mut config = Self::new(token);

        let bind = non_blank(lookup("BIND_ADDR")).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        config.bind_addr = bind.parse().map_err(|_| ApiConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind.clone(),
        })?;

        if let Some(raw) = non_blank(lookup("HUB_QUEUE_CAPACITY")) {
            config.hub_queue_capacity = match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ApiConfigError::Invalid {
                        key: "HUB_QUEUE_CAPACITY",
                        value: raw,
                    });
                }
            };
        }

        config.seed_admin = match (non_blank(lookup("SEED_ADMIN_EMAIL")), non_blank(lookup("SEED_ADMIN_PASSWORD"))) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            _ => return Err(ApiConfigError::PartialSeed),
        };

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
