use std::sync::Arc;
use std::time::Duration;

use juniper::EmptySubscription;

pub mod inputs;
pub mod mutation;
pub mod query;
pub mod types;

use crate::db::SqlitePool;
use crate::gql::mutation::RootMutation;
use crate::gql::query::RootQuery;
use crate::graph::GraphSettings;
use crate::settings::Settings;
use crate::store::{EntityStore, SqliteStore};

/// Per-request dependencies handed to every resolver.
#[derive(Clone)]
pub struct Context {
    pub pool: SqlitePool,
    pub store: Arc<dyn EntityStore>,
    pub graph: GraphSettings,
}

impl juniper::Context for Context {}

impl Context {
    pub fn new(pool: SqlitePool, store: Arc<dyn EntityStore>, graph: GraphSettings) -> Self {
        Self { pool, store, graph }
    }

    /// Context whose graph lookups go to the same database as `pool`.
    pub fn with_sqlite_store(pool: SqlitePool, settings: &Settings) -> Self {
        let timeout = Duration::from_secs(settings.store_timeout);
        let store = Arc::new(SqliteStore::new(pool.clone(), timeout));
        let graph = GraphSettings {
            depth: settings.graph_depth,
        };
        Self::new(pool, store, graph)
    }
}

// A root schema consists of a query, a mutation, and a subscription.
// Request queries can be executed against a RootNode.
pub type Schema = juniper::RootNode<'static, RootQuery, RootMutation, EmptySubscription<Context>>;

#[must_use]
pub fn schema() -> Schema {
    Schema::new(RootQuery, RootMutation, EmptySubscription::<Context>::new())
}
