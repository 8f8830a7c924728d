//! Request/response bodies and their mapping to domain inputs.

use serde::{Deserialize, Deserializer, Serialize};

use postboard_core::{Account, AccountId, Post, PostPatch};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub author_id: AccountId,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    /// Absent leaves content untouched; explicit `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Option<String>>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(body: UpdatePostRequest) -> Self {
        PostPatch {
            title: body.title,
            content: body.content,
        }
    }
}

/// An account together with the posts it authored.
#[derive(Debug, Serialize)]
pub struct AccountWithPosts {
    #[serde(flatten)]
    pub account: Account,
    pub posts: Vec<Post>,
}

fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_post_distinguishes_null_from_absent() {
        let absent: UpdatePostRequest = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(absent.content, None);

        let cleared: UpdatePostRequest = serde_json::from_str(r#"{"content":null}"#).unwrap();
        assert_eq!(cleared.content, Some(None));

        let set: UpdatePostRequest = serde_json::from_str(r#"{"content":"body"}"#).unwrap();
        assert_eq!(set.content, Some(Some("body".to_string())));
    }

    #[test]
    fn create_post_uses_camel_case_author() {
        let body: CreatePostRequest = serde_json::from_str(r#"{"title":"T","authorId":3}"#).unwrap();
        assert_eq!(body.author_id, AccountId::new(3));
        assert_eq!(body.content, None);
    }
}
