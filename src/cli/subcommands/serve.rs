use clap::{App, ArgMatches};
use socialgraph::gql::{self, Context};
use socialgraph::settings::Settings;
use socialgraph::{db, http};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub const NAME: &str = "serve";

pub fn app() -> App<'static> {
    App::new(NAME).about("Start the GraphQL server")
}

pub async fn execute(_matches: &ArgMatches, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let pool = db::setup(settings)?;
    let context = Context::with_sqlite_store(pool, settings);
    let schema = Arc::new(gql::schema());
    let server_addr: SocketAddr = settings.http_server_address.parse()?;
    log::info!("Graph depth {}, store timeout {}s", settings.graph_depth, settings.store_timeout);
    http::serve(server_addr, schema, context).await?;
    log::info!("Server stopped");
    Ok(())
}
