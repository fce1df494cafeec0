//! Environment configuration for the service binary.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORT` | `8080` | Listen port |
//! | `POKEMON_API_URL` | required | Species data API base URL |
//! | `TRANSLATION_API_URL` | required | Translation API base URL |
//! | `SHUTDOWN_TIMEOUT_SECS` | `5` | Drain budget on shutdown, in seconds |

use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: &str = "8080";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing {name} environment variable")]
    MissingVar {
        /// The variable name.
        name: &'static str,
    },

    /// A variable is present but unusable.
    #[error("invalid {name}: {message}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
}

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, built from `PORT`.
    pub addr: String,
    /// Drain budget for graceful shutdown.
    pub shutdown_timeout: Duration,
    /// Base URL of the upstream species data API.
    pub pokemon_api_url: String,
    /// Base URL of the translation API.
    pub translation_api_url: String,
}

impl Config {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// value does not validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let pokemon_api_url = require(&lookup, "POKEMON_API_URL")?;
        let translation_api_url = require(&lookup, "TRANSLATION_API_URL")?;

        let shutdown_timeout = match lookup("SHUTDOWN_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                    name: "SHUTDOWN_TIMEOUT_SECS",
                    message: format!("'{raw}' is not a number of seconds"),
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_SHUTDOWN_TIMEOUT,
        };

        port.parse::<u16>().map_err(|_| ConfigError::InvalidVar {
            name: "PORT",
            message: format!("'{port}' is not a port number"),
        })?;

        let config = Self {
            addr: format!("0.0.0.0:{port}"),
            shutdown_timeout,
            pokemon_api_url,
            translation_api_url,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_url("POKEMON_API_URL", &self.pokemon_api_url)?;
        check_url("TRANSLATION_API_URL", &self.translation_api_url)?;
        Ok(())
    }
}

fn require(
    lookup: impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar { name }),
    }
}

fn check_url(name: &'static str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidVar {
            name,
            message: format!("'{url}' must start with http:// or https://"),
        })
    }
}
