use failure::Fail;
use log::LevelFilter;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

/// Load configuration from a TOML file.
pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let data = fs::read(path.as_ref()).map_err(ReadConfigurationError)?;
    toml::from_slice(&data).map_err(|e| ConfigurationError(e).into())
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Database connection. May be omitted when `DATABASE_URL` is set.
    pub database: Option<Database>,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    /// Validate configuration correctness.
    pub fn validate(&self) -> Result<(), failure::Error> {
        if let Some(ref db) = self.database {
            if db.url.trim().is_empty() {
                return Err(InvalidValueError("database.url").into());
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Database {
    /// PostgreSQL connection URL.
    pub url: String,
}

/// Logging configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Logging {
    /// Default logging level.
    #[serde(default = "default_level_filter")]
    pub level: LevelFilter,
    /// Custom filters.
    #[serde(default)]
    pub filters: HashMap<String, LevelFilter>,
}

#[derive(Debug, Fail)]
#[fail(display = "Cannot read configuration file")]
pub struct ReadConfigurationError(#[fail(cause)] std::io::Error);

#[derive(Debug, Fail)]
#[fail(display = "Invalid configuration: {}", _0)]
pub struct ConfigurationError(#[fail(cause)] toml::de::Error);

#[derive(Debug, Fail)]
#[fail(display = "Invalid configuration: {} must not be empty", _0)]
pub struct InvalidValueError(&'static str);

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: default_level_filter(),
            filters: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_defaults_to_info() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.logging.level, LevelFilter::Info);
        assert!(config.logging.filters.is_empty());
    }

    #[test]
    fn parses_full_configuration() {
        let config: Config = toml::from_str(r#"
            [database]
            url = "postgres://localhost/folio"

            [logging]
            level = "warn"

            [logging.filters]
            folio = "debug"
        "#).unwrap();

        assert_eq!(config.database.unwrap().url, "postgres://localhost/folio");
        assert_eq!(config.logging.level, LevelFilter::Warn);
        assert_eq!(config.logging.filters["folio"], LevelFilter::Debug);
    }

    #[test]
    fn rejects_empty_database_url() {
        let config: Config = toml::from_str(r#"
            [database]
            url = " "
        "#).unwrap();

        assert!(config.validate().is_err());
    }
}
