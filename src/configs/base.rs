use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Config {
    /// Reads `config.toml`, falling back to `config.default.toml`, and to the
    /// built-in defaults when neither exists.
    pub fn load() -> AnyResult<Self> {
        for candidate in ["config.toml", "config.default.toml"] {
            if Path::new(candidate).exists() {
                return Self::from_file(candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn from_file(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        if config_str.trim().is_empty() {
            return Err(format!("{} is empty", path.display()).into());
        }
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> AnyResult<Self> {
        Ok(toml::from_str(config_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.sources.bandcamp);
        assert!(config.logging.is_none());
        assert_eq!(config.http.timeout_ms, 10_000);
        assert!(config.http.proxy.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r#"
            [logging]
            level = "debug"
            filters = "tralbum=trace"
            ansi = false

            [http]
            user_agent = "tralbum-test"
            timeout_ms = 2500

            [http.proxy]
            url = "http://127.0.0.1:3128"

            [sources]
            bandcamp = false
            "#,
        )
        .unwrap();

        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.filters.as_deref(), Some("tralbum=trace"));
        assert!(!logging.ansi);
        assert_eq!(config.http.user_agent, "tralbum-test");
        assert_eq!(config.http.timeout_ms, 2500);
        assert_eq!(config.http.connect_timeout_ms, 3_000);
        assert_eq!(
            config.http.proxy.unwrap().url.as_deref(),
            Some("http://127.0.0.1:3128")
        );
        assert!(!config.sources.bandcamp);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::parse("[http]\ntimeout_ms = \"soon\"").is_err());
    }
}
