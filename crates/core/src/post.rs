//! Post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, DomainError, DomainResult, PostId};

/// A stored post. `author_id` is the ownership record used by access checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: Option<String>,
    pub author_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn apply(&mut self, patch: PostPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub author_id: AccountId,
}

/// Partial update for a post.
///
/// `content` is doubly optional: `Some(None)` clears it, `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<Option<String>>,
}

pub fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_author() {
        let now = Utc::now();
        let post = Post {
            id: PostId::new(9),
            title: "Hello".to_string(),
            content: None,
            author_id: AccountId::new(2),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["authorId"], 2);
        assert_eq!(json["id"], 9);
        assert!(json["content"].is_null());
    }

    #[test]
    fn patch_can_clear_content() {
        let now = Utc::now();
        let mut post = Post {
            id: PostId::new(1),
            title: "T".to_string(),
            content: Some("C".to_string()),
            author_id: AccountId::new(1),
            created_at: now,
            updated_at: now,
        };
        post.apply(
            PostPatch {
                title: None,
                content: Some(None),
            },
            now,
        );
        assert_eq!(post.title, "T");
        assert_eq!(post.content, None);
    }

    #[test]
    fn empty_title_is_invalid() {
        assert!(validate_title("").is_err());
        assert!(validate_title("x").is_ok());
    }
}
