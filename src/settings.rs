use config::{Config, ConfigError};
use serde::Deserialize;

/// Typed view over the layered `config::Config` built by the CLI.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub debug: bool,
    pub log_level: String,
    pub database_url: String,
    pub db_pool_size: u32,
    pub http_server_address: String,
    pub graph_depth: usize,
    /// Seconds allowed for a single entity store call.
    pub store_timeout: u64,
}

/// Registers the built-in value of every settings key as a default on `config`.
///
/// # Errors
///
/// Will return Err if `config` is frozen
pub fn set_defaults(config: &mut Config) -> Result<&mut Config, ConfigError> {
    config
        .set_default("debug", false)?
        .set_default("log_level", "info")?
        .set_default("database_url", "social.sqlite")?
        .set_default("db_pool_size", 8)?
        .set_default("http_server_address", "0.0.0.0:3000")?
        .set_default("graph_depth", 1)?
        .set_default("store_timeout", 5)
}

impl Settings {
    /// # Errors
    ///
    /// Will return Err if a key is missing or has the wrong type
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.clone().try_into()
    }

    /// Settings built from the defaults alone, with no file or environment layered on top.
    ///
    /// # Errors
    ///
    /// Will return Err if the defaults do not deserialize
    pub fn defaults() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        set_defaults(&mut config)?;
        Self::from_config(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings = Settings::defaults().unwrap();
        assert_eq!(settings.database_url, "social.sqlite");
        assert_eq!(settings.db_pool_size, 8);
        assert_eq!(settings.graph_depth, 1);
        assert_eq!(settings.store_timeout, 5);
        assert!(!settings.debug);
    }

    #[test]
    fn layered_values_override_defaults() {
        let mut config = Config::default();
        set_defaults(&mut config).unwrap();
        config.set("graph_depth", 2).unwrap();

        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.graph_depth, 2);
        assert_eq!(settings.log_level, "info");
    }
}
