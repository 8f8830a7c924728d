use serde::{Deserialize, Serialize};

use postboard_core::{Account, AccountId, Post, PostId};

/// First frame every subscriber receives, before any change event.
pub const GREETING: &str = r#"{"type":"hello"}"#;

/// Resource change pushed to real-time subscribers.
///
/// Events are transient facts: built after a successful mutation, serialized
/// once, fanned out, then dropped. The wire form is internally tagged, e.g.
/// `{"type":"post_deleted","postId":7}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    PostCreated {
        post: Post,
    },
    PostUpdated {
        post: Post,
    },
    PostDeleted {
        #[serde(rename = "postId")]
        post_id: PostId,
    },
    AccountUpdated {
        account: Account,
    },
    AccountDeleted {
        #[serde(rename = "accountId")]
        account_id: AccountId,
    },
}

impl ChangeEvent {
    /// Stable event name, identical to the `type` tag on the wire.
    pub fn event_type(&self) -> &'static str {
        match self {
            ChangeEvent::PostCreated { .. } => "post_created",
            ChangeEvent::PostUpdated { .. } => "post_updated",
            ChangeEvent::PostDeleted { .. } => "post_deleted",
            ChangeEvent::AccountUpdated { .. } => "account_updated",
            ChangeEvent::AccountDeleted { .. } => "account_deleted",
        }
    }
}
