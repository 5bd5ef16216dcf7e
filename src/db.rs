use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::embed_migrations;

use crate::settings::Settings;

pub mod member_types;
pub mod posts;
pub mod profiles;
pub mod subscriptions;
pub mod users;

embed_migrations!("migrations");

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type SqlitePooledConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct ForeignKeys;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ForeignKeys {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// # Errors
///
/// Will return Err for any problem in connection to database
pub fn create_pool(settings: &Settings) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    Ok(pool_for(&settings.database_url, settings.db_pool_size)?)
}

/// Builds a pool for `database_url`. An in-memory database is private to one connection, so
/// callers using `:memory:` should ask for a single-connection pool.
///
/// # Errors
///
/// Will return Err for any problem in connection to database
pub fn pool_for(database_url: &str, max_size: u32) -> Result<SqlitePool, r2d2::Error> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ForeignKeys))
        .build(manager)
}

/// # Errors
///
/// Will return Err for any problem in connection to database or applying migrations
pub fn setup(settings: &Settings) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let pool = create_pool(settings)?;
    migrate(&pool, settings.debug)?;
    Ok(pool)
}

/// # Errors
///
/// Will return Err for any problem in connection to database or applying migrations
pub fn migrate(pool: &SqlitePool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    if verbose {
        embedded_migrations::run_with_output(&*conn, &mut std::io::stdout())?;
    } else {
        embedded_migrations::run(&*conn)?;
    }
    log::debug!("Migrations applied");
    Ok(())
}
