use clap::{App, ArgMatches};
use socialgraph::db;
use socialgraph::settings::Settings;
use std::error::Error;

pub const NAME: &str = "migrate";

pub fn app() -> App<'static> {
    App::new(NAME).about("Apply pending database migrations")
}

pub fn execute(_matches: &ArgMatches, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let pool = db::create_pool(settings)?;
    db::migrate(&pool, true)?;
    log::info!("Database {} is up to date", settings.database_url);
    Ok(())
}
