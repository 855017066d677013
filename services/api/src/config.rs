//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use crate::adapters::translations::SUPPORTED_LANGUAGES;
use itinerary_planner_core::PlannerSettings;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub allowed_origin: String,
    pub openai_api_key: Option<String>,
    pub suggestion_model: String,
    pub town_info_model: String,
    pub town_name: String,
    /// `None` when `GENERATION_TIMEOUT_SECS` is `0`.
    pub generation_timeout: Option<Duration>,
    pub delivery_prompt_delay: Duration,
    pub default_language: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var_or =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:3000");

        // --- API Keys (optional here; the binary insists on it) ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.is_empty());

        // --- Adapter-specific Settings ---
        let suggestion_model = var_or("SUGGESTION_MODEL", "gpt-4o-mini");
        let town_info_model = var_or("TOWN_INFO_MODEL", "gpt-4o-mini");
        let town_name = var_or("TOWN_NAME", "our town");

        // --- Conversation Settings ---
        let timeout_secs = parse_number(
            "GENERATION_TIMEOUT_SECS",
            &var_or("GENERATION_TIMEOUT_SECS", "60"),
        )?;
        let generation_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let delay_ms = parse_number(
            "DELIVERY_PROMPT_DELAY_MS",
            &var_or("DELIVERY_PROMPT_DELAY_MS", "1500"),
        )?;
        let delivery_prompt_delay = Duration::from_millis(delay_ms);

        let default_language = var_or("DEFAULT_LANGUAGE", "en").trim().to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&default_language.as_str()) {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_LANGUAGE".to_string(),
                format!("'{}' is not one of {:?}", default_language, SUPPORTED_LANGUAGES),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            allowed_origin,
            openai_api_key,
            suggestion_model,
            town_info_model,
            town_name,
            generation_timeout,
            delivery_prompt_delay,
            default_language,
        })
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            capability_timeout: self.generation_timeout,
            delivery_prompt_delay: self.delivery_prompt_delay,
        }
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|_| {
        ConfigError::InvalidValue(name.to_string(), format!("'{}' is not a whole number", raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.generation_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.delivery_prompt_delay, Duration::from_millis(1500));
        assert_eq!(config.default_language, "en");
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = load(&[("GENERATION_TIMEOUT_SECS", "0")]).unwrap();
        assert!(config.generation_timeout.is_none());
        assert!(config.planner_settings().capability_timeout.is_none());
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = load(&[("BIND_ADDRESS", "nowhere")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "BIND_ADDRESS"));

        let err = load(&[("DELIVERY_PROMPT_DELAY_MS", "soon")]).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue(name, _) if name == "DELIVERY_PROMPT_DELAY_MS")
        );

        let err = load(&[("RUST_LOG", "chatty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "RUST_LOG"));

        let err = load(&[("DEFAULT_LANGUAGE", "fr")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "DEFAULT_LANGUAGE"));
    }
}
