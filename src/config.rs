//! Configuration management for the chat server
//!
//! Loads settings from `config.toml` with environment overrides and
//! falls back to built-in defaults when no file is present.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration loaded once at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// TCP port to listen on
    pub port: u16,

    /// Path to the flat credential file (`username:password` per line)
    pub credentials_file: String,

    /// Maximum accepted length of a single command line, in bytes
    pub max_command_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 12345,
            credentials_file: "users.txt".to_string(),
            max_command_length: 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// The file is optional; defaults apply for anything it does not set.
    /// Environment variables use the `RAX_CHAT` prefix (e.g. RAX_CHAT_PORT).
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_CHAT"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.credentials_file.is_empty() {
            return Err(ConfigError::Message(
                "credentials_file cannot be empty".into(),
            ));
        }

        if self.max_command_length == 0 {
            return Err(ConfigError::Message(
                "max_command_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 12345);
        assert_eq!(config.credentials_file, "users.txt");
        assert_eq!(config.socket_addr(), "0.0.0.0:12345");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ServerConfig {
            credentials_file: String::new(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_command_length: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
