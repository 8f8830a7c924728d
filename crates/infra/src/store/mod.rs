//! Storage collaborator boundary for accounts and posts.
//!
//! Handlers only see these traits; the relational store behind them is an
//! external concern. Lookups are fallible (`Err`) and may come back empty
//! (`Ok(None)`), which callers treat as "not found".

use thiserror::Error;

use postboard_core::{Account, AccountId, AccountPatch, NewAccount, NewPost, Post, PostId, PostPatch};

pub mod in_memory;

pub use in_memory::InMemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint was violated (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced record does not exist (e.g. unknown post author).
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// The backing store failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn create_account(&self, new: NewAccount) -> StoreResult<Account>;

    async fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    async fn list_accounts(&self) -> StoreResult<Vec<Account>>;

    /// `Ok(None)` when the account does not exist.
    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Option<Account>>;

    /// Deletes the account and everything it owns. Returns whether it existed.
    async fn delete_account(&self, id: AccountId) -> StoreResult<bool>;
}

#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    /// Fails with `MissingReference` when the author does not exist.
    async fn create_post(&self, new: NewPost) -> StoreResult<Post>;

    async fn find_post(&self, id: PostId) -> StoreResult<Option<Post>>;

    /// Ownership record for a post: its author, or `None` if the post is gone.
    async fn find_post_owner(&self, id: PostId) -> StoreResult<Option<AccountId>> {
        Ok(self.find_post(id).await?.map(|p| p.author_id))
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn list_posts_by_author(&self, author_id: AccountId) -> StoreResult<Vec<Post>>;

    async fn update_post(&self, id: PostId, patch: PostPatch) -> StoreResult<Option<Post>>;

    async fn delete_post(&self, id: PostId) -> StoreResult<bool>;
}
