use clap::App;
use clap::ArgMatches;
use socialgraph::settings::Settings;
use std::error::Error;

pub mod migrate;
pub mod schema;
pub mod serve;

pub fn setup(app: App<'static>) -> App<'static> {
    app.subcommand(serve::app())
        .subcommand(migrate::app())
        .subcommand(schema::app())
}

pub async fn execute(settings: &Settings, app_m: ArgMatches) -> Result<(), Box<dyn Error>> {
    match app_m.subcommand() {
        Some((serve::NAME, sub_m)) => serve::execute(sub_m, settings).await,
        Some((migrate::NAME, sub_m)) => migrate::execute(sub_m, settings),
        Some((schema::NAME, sub_m)) => schema::execute(sub_m, settings),
        _ => Ok(()),
    }
}
