#[macro_use]
extern crate diesel;

#[macro_use]
extern crate diesel_migrations;

pub mod db;
pub mod gql;
pub mod graph;
pub mod http;
pub mod loader;
pub mod models;
pub mod schema;
pub mod settings;
pub mod store;
