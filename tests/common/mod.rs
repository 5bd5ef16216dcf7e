#![allow(dead_code)]

use juniper::Variables;
use serde_json::Value as Json;
use socialgraph::db::{self, SqlitePool};
use socialgraph::gql::{self, Context};
use socialgraph::settings::Settings;

/// Migrated in-memory database. One connection, since each `:memory:` connection is its own
/// database.
pub fn pool() -> SqlitePool {
    let pool = db::pool_for(":memory:", 1).unwrap();
    db::migrate(&pool, false).unwrap();
    pool
}

pub fn context() -> Context {
    Context::with_sqlite_store(pool(), &Settings::defaults().unwrap())
}

/// Executes `query` and returns its data as JSON, failing on any field error.
pub async fn run(context: &Context, query: &str) -> Json {
    let (data, errors) = run_with_errors(context, query).await;
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    data
}

pub async fn run_with_errors(context: &Context, query: &str) -> (Json, Vec<String>) {
    let schema = gql::schema();
    let (value, errors) = juniper::execute(query, None, &schema, &Variables::new(), context)
        .await
        .unwrap();
    let messages = errors
        .iter()
        .map(|error| error.error().message().to_owned())
        .collect();
    (serde_json::to_value(&value).unwrap(), messages)
}
