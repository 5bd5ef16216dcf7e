//! In-memory entity store, test support only. Built for unit tests and behind the
//! `test-util` feature.
//!
//! Records every call it receives so callers can assert on batching behaviour, and can be told
//! to fail lookups for a given entity kind or relation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Entity, EntityKind, EntityStore, Relation, StoreError, StoreResult};
use crate::models::{MemberTypeId, Post, Profile, User};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Entities { kind: EntityKind, ids: Vec<Uuid> },
    Related { relation: Relation, owners: Vec<Uuid> },
}

#[derive(Default)]
struct Rows {
    entities: HashMap<Uuid, Entity>,
    // (subscriber, author) in insertion order
    subscriptions: Vec<(Uuid, Uuid)>,
    posts: Vec<(Uuid, Uuid)>,
    profiles: Vec<(Uuid, Uuid)>,
}

#[derive(Default)]
struct Faults {
    kinds: HashSet<EntityKind>,
    relations: HashSet<Relation>,
    owners: HashSet<(Relation, Uuid)>,
    delay: Option<Duration>,
}

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Rows>,
    faults: RwLock<Faults>,
    calls: RwLock<Vec<StoreCall>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub async fn add_user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let user = User {
            id: id.to_string(),
            name: String::from(name),
            balance: 0.0,
        };
        self.rows.write().await.entities.insert(id, Entity::User(user));
        id
    }

    pub async fn add_post(&self, author: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        let post = Post {
            id: id.to_string(),
            title: String::from(title),
            content: String::new(),
            author_id: author.to_string(),
        };
        let mut rows = self.rows.write().await;
        rows.entities.insert(id, Entity::Post(post));
        rows.posts.push((author, id));
        id
    }

    pub async fn add_profile(&self, owner: Uuid, member_type: MemberTypeId) -> Uuid {
        let id = Uuid::new_v4();
        let profile = Profile {
            id: id.to_string(),
            is_male: false,
            year_of_birth: 1990,
            user_id: owner.to_string(),
            member_type_id: String::from(member_type.as_str()),
        };
        let mut rows = self.rows.write().await;
        rows.entities.insert(id, Entity::Profile(profile));
        rows.profiles.push((owner, id));
        id
    }

    /// Records that `subscriber` follows `author`.
    pub async fn subscribe(&self, subscriber: Uuid, author: Uuid) {
        self.rows.write().await.subscriptions.push((subscriber, author));
    }

    pub async fn fail_kind(&self, kind: EntityKind) {
        self.faults.write().await.kinds.insert(kind);
    }

    pub async fn fail_relation(&self, relation: Relation) {
        self.faults.write().await.relations.insert(relation);
    }

    /// Fails any `relation` lookup whose owner set includes `owner`.
    pub async fn fail_related_for(&self, relation: Relation, owner: Uuid) {
        self.faults.write().await.owners.insert((relation, owner));
    }

    /// Makes every subsequent call wait `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        self.faults.write().await.delay = Some(delay);
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().await.clone()
    }

    /// Owner sets passed to `get_related` for `relation`, one entry per call.
    pub async fn related_calls(&self, relation: Relation) -> Vec<Vec<Uuid>> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                StoreCall::Related {
                    relation: called,
                    owners,
                } if *called == relation => Some(owners.clone()),
                _ => None,
            })
            .collect()
    }

    /// Id sets passed to `get_by_ids` for `kind`, one entry per call.
    pub async fn entity_calls(&self, kind: EntityKind) -> Vec<Vec<Uuid>> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                StoreCall::Entities { kind: called, ids } if *called == kind => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    async fn delay(&self) {
        let delay = self.faults.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Entity>> {
        self.calls.write().await.push(StoreCall::Entities {
            kind,
            ids: ids.to_vec(),
        });
        self.delay().await;
        if self.faults.read().await.kinds.contains(&kind) {
            return Err(StoreError::Unavailable(format!("{} lookup failed", kind)));
        }
        let rows = self.rows.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| {
                rows.entities
                    .get(id)
                    .filter(|entity| entity.kind() == kind)
                    .map(|entity| (*id, entity.clone()))
            })
            .collect())
    }

    async fn get_related(
        &self,
        relation: Relation,
        owner_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<Uuid>>> {
        self.calls.write().await.push(StoreCall::Related {
            relation,
            owners: owner_ids.to_vec(),
        });
        self.delay().await;
        {
            let faults = self.faults.read().await;
            if faults.relations.contains(&relation)
                || owner_ids
                    .iter()
                    .any(|owner| faults.owners.contains(&(relation, *owner)))
            {
                return Err(StoreError::Unavailable(format!("{} lookup failed", relation)));
            }
        }
        let rows = self.rows.read().await;
        let edges: Vec<(Uuid, Uuid)> = match relation {
            Relation::UserSubscribedTo => rows.subscriptions.clone(),
            Relation::SubscribedToUser => rows
                .subscriptions
                .iter()
                .map(|(subscriber, author)| (*author, *subscriber))
                .collect(),
            Relation::AuthoredPosts => rows.posts.clone(),
            Relation::OwnedProfile => rows.profiles.clone(),
        };
        let mut related: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for owner in owner_ids {
            let targets = edges
                .iter()
                .filter(|(from, _)| from == owner)
                .map(|(_, to)| *to)
                .collect();
            related.insert(*owner, targets);
        }
        Ok(related)
    }
}
