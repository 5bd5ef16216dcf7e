use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use uuid::Uuid;

use super::{Entity, EntityKind, EntityStore, Relation, StoreError, StoreResult};
use crate::db::SqlitePool;
use crate::models;

// Stays under SQLite's default bound-parameter limit.
const MAX_KEYS_PER_QUERY: usize = 500;

/// Entity store over the diesel connection pool.
///
/// Every call runs on the blocking thread pool and is abandoned with
/// [`StoreError::Timeout`] once `timeout` elapses.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn blocking<T, F>(&self, query: F) -> StoreResult<T>
    where
        F: FnOnce(&SqliteConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let task = tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            query(&conn)
        });
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined.map_err(|error| StoreError::Task(error.to_string()))?,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

fn parse_key(id: &str) -> StoreResult<Uuid> {
    models::parse_key(id).map_err(|source| StoreError::InvalidKey {
        id: String::from(id),
        source,
    })
}

fn load_entities(
    conn: &SqliteConnection,
    kind: EntityKind,
    keys: &[String],
) -> StoreResult<Vec<(String, Entity)>> {
    Ok(match kind {
        EntityKind::User => {
            use crate::schema::users::dsl::{id, users};
            users
                .filter(id.eq_any(keys))
                .load::<models::User>(conn)?
                .into_iter()
                .map(|row| (row.id.clone(), Entity::User(row)))
                .collect()
        }
        EntityKind::Profile => {
            use crate::schema::profiles::dsl::{id, profiles};
            profiles
                .filter(id.eq_any(keys))
                .load::<models::Profile>(conn)?
                .into_iter()
                .map(|row| (row.id.clone(), Entity::Profile(row)))
                .collect()
        }
        EntityKind::Post => {
            use crate::schema::posts::dsl::{id, posts};
            posts
                .filter(id.eq_any(keys))
                .load::<models::Post>(conn)?
                .into_iter()
                .map(|row| (row.id.clone(), Entity::Post(row)))
                .collect()
        }
    })
}

/// Loads `(owner, related)` pairs ordered by owner, then related id.
fn load_edges(
    conn: &SqliteConnection,
    relation: Relation,
    owners: &[String],
) -> StoreResult<Vec<(String, String)>> {
    Ok(match relation {
        Relation::UserSubscribedTo => {
            use crate::schema::subscribers_on_authors::dsl::{
                author_id, subscriber_id, subscribers_on_authors,
            };
            subscribers_on_authors
                .filter(subscriber_id.eq_any(owners))
                .select((subscriber_id, author_id))
                .order((subscriber_id.asc(), author_id.asc()))
                .load::<(String, String)>(conn)?
        }
        Relation::SubscribedToUser => {
            use crate::schema::subscribers_on_authors::dsl::{
                author_id, subscriber_id, subscribers_on_authors,
            };
            subscribers_on_authors
                .filter(author_id.eq_any(owners))
                .select((author_id, subscriber_id))
                .order((author_id.asc(), subscriber_id.asc()))
                .load::<(String, String)>(conn)?
        }
        Relation::AuthoredPosts => {
            use crate::schema::posts::dsl::{author_id, id, posts};
            posts
                .filter(author_id.eq_any(owners))
                .select((author_id, id))
                .order((author_id.asc(), id.asc()))
                .load::<(String, String)>(conn)?
        }
        Relation::OwnedProfile => {
            use crate::schema::profiles::dsl::{id, profiles, user_id};
            profiles
                .filter(user_id.eq_any(owners))
                .select((user_id, id))
                .order((user_id.asc(), id.asc()))
                .load::<(String, String)>(conn)?
        }
    })
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn get_by_ids(&self, kind: EntityKind, ids: &[Uuid]) -> StoreResult<HashMap<Uuid, Entity>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let keys: Vec<String> = ids.iter().map(Uuid::to_string).collect();
        log::trace!("Loading {} {} rows", keys.len(), kind);
        self.blocking(move |conn| {
            let mut found = HashMap::with_capacity(keys.len());
            for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
                for (id, entity) in load_entities(conn, kind, chunk)? {
                    found.insert(parse_key(&id)?, entity);
                }
            }
            Ok(found)
        })
        .await
    }

    async fn get_related(
        &self,
        relation: Relation,
        owner_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<Uuid>>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let owners: Vec<String> = owner_ids.iter().map(Uuid::to_string).collect();
        log::trace!("Loading {} for {} owners", relation, owners.len());
        self.blocking(move |conn| {
            let mut related: HashMap<Uuid, Vec<Uuid>> = HashMap::with_capacity(owners.len());
            for chunk in owners.chunks(MAX_KEYS_PER_QUERY) {
                for (owner, other) in load_edges(conn, relation, chunk)? {
                    related
                        .entry(parse_key(&owner)?)
                        .or_default()
                        .push(parse_key(&other)?);
                }
            }
            Ok(related)
        })
        .await
    }
}
