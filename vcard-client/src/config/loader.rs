use std::path::Path;
use thiserror::Error;
use url::Url;

use super::types::ClientConfigFile;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Proxy mode is enabled but no proxy_origin is configured")]
    MissingProxyOrigin,
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Load client configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<ClientConfigFile, ConfigError> {
    let config: ClientConfigFile = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<ClientConfigFile, ConfigError> {
    let default_config = include_str!("client_config.json");
    load_config_from_str(default_config)
}

impl ClientConfigFile {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.proxy && self.provider.proxy_origin.is_none() {
            return Err(ConfigError::MissingProxyOrigin);
        }
        self.base_url()?;
        Ok(())
    }

    /// Parsed base URL, honouring proxy mode
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.provider.base_url();
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
    }
}
