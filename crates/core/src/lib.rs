//! `postboard-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** types (no infrastructure concerns):
//! identifiers, the account/post models and the domain error.

pub mod account;
pub mod error;
pub mod id;
pub mod post;
pub mod role;

pub use account::{Account, AccountPatch, NewAccount};
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, PostId};
pub use post::{NewPost, Post, PostPatch};
pub use role::Role;
