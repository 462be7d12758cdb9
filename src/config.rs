//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (development, production)
    pub environment: String,

    /// Debug flag
    pub debug: bool,

    /// Path of the serialized classifier
    pub model_path: PathBuf,

    /// Server port
    pub port: u16,

    /// Default log verbosity (overridden by RUST_LOG)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            debug: false,
            model_path: PathBuf::from("best_model.json"),
            port: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            environment: lookup("APP_ENV")
                .or_else(|| lookup("FLASK_ENV"))
                .unwrap_or(defaults.environment),

            debug: lookup("APP_DEBUG")
                .or_else(|| lookup("FLASK_DEBUG"))
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.debug),

            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            log_level: lookup("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
