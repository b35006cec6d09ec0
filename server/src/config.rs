//! Process configuration module.
//!
//! Settings needed before `config.json` can even be found, loaded from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `KEYSHARE_ADMIN_API_KEY`: API key for the admin reload endpoint (required)
//! - `KEYSHARE_RESOURCE_DIRECTORY`: Directory holding `config.json` and key files (default: `./resources`)
//! - `KEYSHARE_LISTEN_PORT`: Port for the admin listener (default: `8080`)
//!
//! # Invariants
//!
//! - `resource_directory` is always a valid path (may not exist yet)
//! - `listen_port` is always a valid port number
//! - `admin_api_key` is never empty

use std::path::PathBuf;

/// Server process configuration.
///
/// # Post-conditions
///
/// - `admin_api_key` is non-empty
/// - `resource_directory` is a valid path
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// API key required by the admin reload endpoint.
    pub admin_api_key: String,
    /// Root directory of the resource store.
    pub resource_directory: PathBuf,
    /// Port the admin listener binds to.
    pub listen_port: u16,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

const ADMIN_API_KEY_VAR: &str = "KEYSHARE_ADMIN_API_KEY";
const RESOURCE_DIRECTORY_VAR: &str = "KEYSHARE_RESOURCE_DIRECTORY";
const LISTEN_PORT_VAR: &str = "KEYSHARE_LISTEN_PORT";

impl ServerConfig {
    /// Default admin listener port.
    pub const DEFAULT_PORT: u16 = 8080;
    /// Default resource directory.
    pub const DEFAULT_RESOURCE_DIRECTORY: &'static str = "./resources";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `KEYSHARE_ADMIN_API_KEY` is not set or is empty
    /// - `KEYSHARE_LISTEN_PORT` is set but not a valid port number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let admin_api_key = Self::load_admin_api_key(lookup(ADMIN_API_KEY_VAR))?;
        let resource_directory = lookup(RESOURCE_DIRECTORY_VAR)
            .map_or_else(|| PathBuf::from(Self::DEFAULT_RESOURCE_DIRECTORY), PathBuf::from);
        let listen_port = Self::load_listen_port(lookup(LISTEN_PORT_VAR))?;

        Ok(Self {
            admin_api_key,
            resource_directory,
            listen_port,
        })
    }

    fn load_admin_api_key(value: Option<String>) -> Result<String, ConfigError> {
        let key = value.ok_or_else(|| ConfigError::MissingEnvVar(ADMIN_API_KEY_VAR.to_string()))?;

        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: ADMIN_API_KEY_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(key)
    }

    fn load_listen_port(value: Option<String>) -> Result<u16, ConfigError> {
        match value {
            Some(value) => match value.parse::<u16>() {
                Ok(port) if port != 0 => Ok(port),
                _ => Err(ConfigError::InvalidValue {
                    name: LISTEN_PORT_VAR.to_string(),
                    message: format!("'{value}' is not a valid port number (must be 1-65535)"),
                }),
            },
            None => Ok(Self::DEFAULT_PORT),
        }
    }
}
