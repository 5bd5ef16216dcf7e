//! Batched read access to the persisted social graph.
//!
//! An [`EntityStore`] answers whole key sets in one logical call. It never raises for missing
//! rows: absent entities are simply left out of the returned map and owners without related
//! rows map to an empty list. The store does no caching of its own.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Post, Profile, User};

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod sqlite;

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Entity types that can be looked up in batches by UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    Profile,
    Post,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Profile => "profile",
            Self::Post => "post",
        })
    }
}

/// Named, directed edges between entities, each owned by a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    /// Authors the owner subscribes to.
    UserSubscribedTo,
    /// Subscribers of the owner.
    SubscribedToUser,
    /// Posts written by the owner.
    AuthoredPosts,
    /// The owner's profile, at most one.
    OwnedProfile,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserSubscribedTo => "userSubscribedTo",
            Self::SubscribedToUser => "subscribedToUser",
            Self::AuthoredPosts => "posts",
            Self::OwnedProfile => "profile",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    User(User),
    Profile(Profile),
    Post(Post),
}

impl Entity {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Profile(_) => EntityKind::Profile,
            Self::Post(_) => EntityKind::Post,
        }
    }

    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_profile(self) -> Option<Profile> {
        match self {
            Self::Profile(profile) => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_post(self) -> Option<Post> {
        match self {
            Self::Post(post) => Some(post),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("store task failed: {0}")]
    Task(String),

    #[error("store call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("stored id {id:?} is not a valid key: {source}")]
    InvalidKey {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Looks up every id of `kind` at once. Ids with no row are absent from the result.
    async fn get_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Entity>>;

    /// Lists related keys for every owner at once, in the store's stable order. Owners
    /// without related rows may be absent or map to an empty list.
    async fn get_related(
        &self,
        relation: Relation,
        owner_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<Uuid>>>;
}
