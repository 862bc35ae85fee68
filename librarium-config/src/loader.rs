use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;
use crate::models::Config;

/// Environment variables recognized by the loader. Each overrides the
/// corresponding file/default value.
const ENV_SERVER_HOST: &str = "LIBRARIUM_SERVER_HOST";
const ENV_SERVER_PORT: &str = "LIBRARIUM_SERVER_PORT";
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_DATABASE_MAX_CONNECTIONS: &str = "LIBRARIUM_DATABASE_MAX_CONNECTIONS";
const ENV_DATABASE_MIGRATE: &str = "LIBRARIUM_DATABASE_MIGRATE";

#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration: defaults, then the TOML file when one is
    /// given, then environment overrides.
    pub fn load(file: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };
        Self::apply_env(&mut config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Unparsable {
            path: path.display().to_string(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var(ENV_SERVER_HOST) {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var(ENV_SERVER_PORT) {
            config.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_SERVER_PORT,
                reason: format!("expected a port number, got \"{port}\""),
            })?;
        }
        if let Ok(url) = std::env::var(ENV_DATABASE_URL) {
            config.database.url = url;
        }
        if let Ok(max) = std::env::var(ENV_DATABASE_MAX_CONNECTIONS) {
            config.database.max_connections = max.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_DATABASE_MAX_CONNECTIONS,
                reason: format!("expected an integer, got \"{max}\""),
            })?;
        }
        if let Ok(migrate) = std::env::var(ENV_DATABASE_MIGRATE) {
            config.database.migrate_on_startup =
                migrate.parse().map_err(|_| ConfigError::Invalid {
                    key: ENV_DATABASE_MIGRATE,
                    reason: format!("expected true or false, got \"{migrate}\""),
                })?;
        }
        Ok(())
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "server.host",
                reason: "host must not be blank".to_string(),
            });
        }
        if config.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database.url",
                reason: "database url must not be blank".to_string(),
            });
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "at least one connection is required".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_stand_alone() {
        let config = Config::default();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8090");
        assert!(config.database.migrate_on_startup);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[database]
max_connections = 5
"#
        )
        .unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 5);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nprot = 9000").unwrap();
        assert!(matches!(
            ConfigLoader::from_file(file.path()),
            Err(ConfigError::Unparsable { .. })
        ));
    }

    #[test]
    fn zero_connections_fail_validation() {
        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
