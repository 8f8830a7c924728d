//! Shared service handles, created once at startup and passed to handlers
//! as `Extension<Arc<AppServices>>`.

use std::sync::Arc;

use postboard_auth::{
    AccessGuard, Argon2Hasher, Hs256TokenService, PasswordError, PasswordHasher, Role, TokenIssuer,
};
use postboard_core::NewAccount;
use postboard_events::{BroadcastHub, ChangeEvent};
use postboard_infra::{AccountStore, InMemoryStore, PostStore, StoreError};

use crate::config::{ApiConfig, SeedAdmin};

pub struct AppServices {
    pub guard: AccessGuard,
    pub tokens: Arc<dyn TokenIssuer>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub accounts: Arc<dyn AccountStore>,
    pub posts: Arc<dyn PostStore>,
    pub hub: Arc<BroadcastHub>,
}

impl AppServices {
    /// Production wiring: HS256 tokens, Argon2 hashing, in-memory storage.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::builder(config).build()
    }

    /// Start from the production wiring and swap individual collaborators.
    pub fn builder(config: &ApiConfig) -> AppServicesBuilder {
        let tokens = Arc::new(Hs256TokenService::new(&config.token));
        // One store backs both traits so posts can reference accounts.
        let store = Arc::new(InMemoryStore::new());
        AppServicesBuilder {
            guard: AccessGuard::new(tokens.clone()),
            tokens,
            hasher: Arc::new(Argon2Hasher::new()),
            accounts: store.clone(),
            posts: store,
            hub: Arc::new(BroadcastHub::with_queue_capacity(config.hub_queue_capacity)),
        }
    }

    /// Hand a change event to the hub after a successful mutation.
    ///
    /// Fire-and-forget: delivery outcomes are logged by the hub and never
    /// reach the caller.
    pub fn emit(&self, event: ChangeEvent) {
        let report = self.hub.publish(&event);
        tracing::debug!(
            event_type = event.event_type(),
            delivered = report.delivered,
            evicted = report.evicted,
            "change event emitted"
        );
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    pub async fn hash_password(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    pub async fn verify_password(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::Hashing(e.to_string()))?
    }

    /// Create the configured admin account unless one with that email exists.
    pub async fn seed_admin(&self, seed: &SeedAdmin) -> anyhow::Result<()> {
        if self.accounts.find_account_by_email(&seed.email).await?.is_some() {
            tracing::info!(email = %seed.email, "seed admin already present");
            return Ok(());
        }

        let password_hash = self.hash_password(seed.password.clone()).await?;
        let new = NewAccount {
            name: "Administrator".to_string(),
            email: seed.email.clone(),
            password_hash,
            role: Role::Admin,
        };
        match self.accounts.create_account(new).await {
            Ok(account) => {
                tracing::info!(account_id = %account.id, email = %account.email, "seeded admin account");
                Ok(())
            }
            // Lost a race with a concurrent registration of the same email.
            Err(StoreError::Conflict(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

pub struct AppServicesBuilder {
    guard: AccessGuard,
    tokens: Arc<dyn TokenIssuer>,
    hasher: Arc<dyn PasswordHasher>,
    accounts: Arc<dyn AccountStore>,
    posts: Arc<dyn PostStore>,
    hub: Arc<BroadcastHub>,
}

impl AppServicesBuilder {
    pub fn hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn accounts(mut self, accounts: Arc<dyn AccountStore>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn posts(mut self, posts: Arc<dyn PostStore>) -> Self {
        self.posts = posts;
        self
    }

    pub fn hub(mut self, hub: Arc<BroadcastHub>) -> Self {
        self.hub = hub;
        self
    }

    pub fn build(self) -> AppServices {
        AppServices {
            guard: self.guard,
            tokens: self.tokens,
            hasher: self.hasher,
            accounts: self.accounts,
            posts: self.posts,
            hub: self.hub,
        }
    }
}
