use clap::{crate_authors, crate_description, crate_name, crate_version, App, AppSettings, Arg};
use socialgraph::settings::Settings;
use std::error::Error;

pub mod config;
pub mod logging;
pub mod subcommands;

pub async fn execute() -> Result<(), Box<dyn Error>> {
    let app = subcommands::setup(app());
    let app_m = app.get_matches();
    let config = config::setup(&app_m)?;
    let settings = Settings::from_config(&config)?;
    logging::setup(&settings)?;
    subcommands::execute(&settings, app_m).await?;
    Ok(())
}

fn app() -> App<'static> {
    App::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .setting(AppSettings::ArgRequiredElseHelp)
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Turn debugging information on"),
        )
}
