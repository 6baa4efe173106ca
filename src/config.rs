//! Runtime settings, layered from defaults, an optional config file and
//! `TRIVIA__`-prefixed environment variables.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "trivia";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created on first start.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("database.path", "trivia.db")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)
}

impl Settings {
    /// Loads settings. Without an explicit `file`, `trivia.{toml,yaml,json,...}`
    /// in the working directory is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let file = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        defaults()?
            .add_source(file)
            .add_source(
                Environment::with_prefix("TRIVIA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn defaults_are_complete() {
        let settings: Settings = defaults().unwrap().build().unwrap().try_deserialize().unwrap();
        assert_eq!(settings.database.path, PathBuf::from("trivia.db"));
        assert_eq!(settings.server.address(), "0.0.0.0:8080");
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            [database]
            path = "/var/lib/trivia/trivia.db"

            [server]
            port = 5000
        "#;
        let settings: Settings = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(
            settings.database.path,
            PathBuf::from("/var/lib/trivia/trivia.db")
        );
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 5000);
    }
}
