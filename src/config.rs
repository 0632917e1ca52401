//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Service configuration, read from `FAMLINK_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the question catalog JSON file.
    pub questions_path: PathBuf,
    /// Path to the session database file.
    pub db_path: PathBuf,
    /// HTTP listen port.
    pub port: u16,
    /// BCP 47 language tag the presenter phrases questions in.
    pub language: String,
    /// Upper bound on a single text-generation call. The presenter falls
    /// back to the raw question text when this elapses.
    pub generation_timeout: Duration,
    /// Model identifier passed to the LLM provider.
    pub model: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            questions_path: PathBuf::from("./config/questions.json"),
            db_path: PathBuf::from("./data/famlink-onboarding.db"),
            port: 8080,
            language: "da".to_string(),
            generation_timeout: Duration::from_secs(20),
            model: "claude-sonnet-4-20250514".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Build a config from the environment, falling back to defaults for
    /// anything unset. Fails only on values that are present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let questions_path = std::env::var("FAMLINK_QUESTIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.questions_path);

        let db_path = std::env::var("FAMLINK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let port = match std::env::var("FAMLINK_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "FAMLINK_PORT".to_string(),
                message: format!("{raw:?} is not a valid port"),
            })?,
            Err(_) => defaults.port,
        };

        let language =
            std::env::var("FAMLINK_LANGUAGE").unwrap_or(defaults.language);

        let generation_timeout = match std::env::var("FAMLINK_GENERATION_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "FAMLINK_GENERATION_TIMEOUT_SECS".to_string(),
                    message: format!("{raw:?} is not a valid number of seconds"),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.generation_timeout,
        };

        let model = std::env::var("FAMLINK_MODEL").unwrap_or(defaults.model);

        Ok(Self {
            questions_path,
            db_path,
            port,
            language,
            generation_timeout,
            model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.language, "da");
        assert_eq!(config.generation_timeout, Duration::from_secs(20));
    }
}
