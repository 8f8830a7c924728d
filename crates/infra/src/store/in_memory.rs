use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use postboard_core::{Account, AccountId, AccountPatch, NewAccount, NewPost, Post, PostId, PostPatch};

use super::{AccountStore, PostStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    posts: BTreeMap<PostId, Post>,
    last_account_id: i64,
    last_post_id: i64,
}

/// In-memory account/post store for tests/dev.
///
/// Ids come from per-table sequences starting at 1. Lists are ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn email_taken(state: &State, email: &str, except: Option<AccountId>) -> bool {
    state
        .accounts
        .values()
        .any(|a| a.email == email && Some(a.id) != except)
}

#[async_trait::async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, new: NewAccount) -> StoreResult<Account> {
        let mut state = self.write();
        if email_taken(&state, &new.email, None) {
            return Err(StoreError::Conflict(format!("email '{}' already in use", new.email)));
        }

        state.last_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(state.last_account_id),
            name: new.name,
            email: new.email,
            role: new.role,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_account_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.read().accounts.get(&id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self.read().accounts.values().find(|a| a.email == email).cloned())
    }

    async fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self.read().accounts.values().cloned().collect())
    }

    async fn update_account(&self, id: AccountId, patch: AccountPatch) -> StoreResult<Option<Account>> {
        let mut state = self.write();
        if let Some(email) = &patch.email {
            if email_taken(&state, email, Some(id)) {
                return Err(StoreError::Conflict(format!("email '{email}' already in use")));
            }
        }

        let Some(account) = state.accounts.get_mut(&id) else {
            return Ok(None);
        };
        account.apply(patch, Utc::now());
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: AccountId) -> StoreResult<bool> {
        let mut state = self.write();
        if state.accounts.remove(&id).is_none() {
            return Ok(false);
        }
        let before = state.posts.len();
        state.posts.retain(|_, p| p.author_id != id);
        let removed = before - state.posts.len();
        if removed > 0 {
            tracing::debug!(account_id = %id, posts = removed, "cascade-deleted posts");
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl PostStore for InMemoryStore {
    async fn create_post(&self, new: NewPost) -> StoreResult<Post> {
        let mut state = self.write();
        if !state.accounts.contains_key(&new.author_id) {
            return Err(StoreError::MissingReference(format!(
                "author {} does not exist",
                new.author_id
            )));
        }

        state.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: PostId::new(state.last_post_id),
            title: new.title,
            content: new.content,
            author_id: new.author_id,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.read().posts.get(&id).cloned())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.read().posts.values().cloned().collect())
    }

    async fn list_posts_by_author(&self, author_id: AccountId) -> StoreResult<Vec<Post>> {
        Ok(self
            .read()
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn update_post(&self, id: PostId, patch: PostPatch) -> StoreResult<Option<Post>> {
        let mut state = self.write();
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.apply(patch, Utc::now());
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<bool> {
        Ok(self.write().posts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postboard_core::Role;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            name: "Tester".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    fn new_post(author_id: AccountId, title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: None,
            author_id,
        }
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let store = InMemoryStore::new();
        let a = store.create_account(new_account("a@test.com")).await.unwrap();
        let b = store.create_account(new_account("b@test.com")).await.unwrap();
        assert_eq!(a.id, AccountId::new(1));
        assert_eq!(b.id, AccountId::new(2));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        store.create_account(new_account("a@test.com")).await.unwrap();
        let err = store.create_account(new_account("a@test.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_cannot_steal_another_email() {
        let store = InMemoryStore::new();
        let a = store.create_account(new_account("a@test.com")).await.unwrap();
        store.create_account(new_account("b@test.com")).await.unwrap();

        let patch = AccountPatch {
            email: Some("b@test.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_account(a.id, patch).await,
            Err(StoreError::Conflict(_))
        ));

        // Re-submitting your own email is fine.
        let patch = AccountPatch {
            email: Some("a@test.com".to_string()),
            ..Default::default()
        };
        assert!(store.update_account(a.id, patch).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn post_requires_existing_author() {
        let store = InMemoryStore::new();
        let err = store.create_post(new_post(AccountId::new(42), "T")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn owner_lookup_follows_author() {
        let store = InMemoryStore::new();
        let a = store.create_account(new_account("a@test.com")).await.unwrap();
        let post = store.create_post(new_post(a.id, "T")).await.unwrap();

        assert_eq!(store.find_post_owner(post.id).await.unwrap(), Some(a.id));
        assert_eq!(store.find_post_owner(PostId::new(999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn deleting_account_cascades_to_posts() {
        let store = InMemoryStore::new();
        let a = store.create_account(new_account("a@test.com")).await.unwrap();
        let b = store.create_account(new_account("b@test.com")).await.unwrap();
        store.create_post(new_post(a.id, "mine")).await.unwrap();
        store.create_post(new_post(b.id, "theirs")).await.unwrap();

        assert!(store.delete_account(a.id).await.unwrap());
        assert!(!store.delete_account(a.id).await.unwrap());

        let remaining = store.list_posts().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].author_id, b.id);
    }

    #[tokio::test]
    async fn update_and_delete_missing_post() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.update_post(PostId::new(1), PostPatch::default()).await.unwrap(),
            None
        );
        assert!(!store.delete_post(PostId::new(1)).await.unwrap());
    }
}
