use clap::ArgMatches;
use config::Config;
use socialgraph::settings;
use std::error::Error;

pub fn setup(app_m: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::default();
    settings::set_defaults(&mut config)?
        .merge(config::File::with_name("config").required(false))?
        .merge(config::Environment::with_prefix("APP"))?;

    if app_m.is_present("debug") {
        config.set("debug", true)?;
        config.set("log_level", "debug")?;
    }

    Ok(config)
}
