use socialgraph::settings::Settings;

pub fn setup(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_with_defaults = env_logger::Env::default().default_filter_or(&settings.log_level);
    env_logger::Builder::from_env(env_with_defaults).try_init()?;
    Ok(())
}
