use clap::{App, ArgMatches};
use socialgraph::gql;
use socialgraph::settings::Settings;
use std::error::Error;

pub const NAME: &str = "schema";

pub fn app() -> App<'static> {
    App::new(NAME).about("Print the GraphQL schema")
}

pub fn execute(_matches: &ArgMatches, _settings: &Settings) -> Result<(), Box<dyn Error>> {
    println!("{}", gql::schema().as_schema_language());
    Ok(())
}
