use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigFile {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub payments: PaymentConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where and how to reach the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider REST origin
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Route calls through `proxy_origin` instead of `api_url`
    #[serde(default)]
    pub proxy: bool,
    /// Hosting origin that forwards to the provider (proxy mode)
    #[serde(default)]
    pub proxy_origin: Option<String>,
    /// Value sent in the `Origin` header
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Request timeout; transport default when absent
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Product family the card listing is scoped to
    #[serde(default = "default_card_vas_alias")]
    pub card_vas_alias: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            api_url: default_api_url(),
            proxy: false,
            proxy_origin: None,
            origin: default_origin(),
            timeout_ms: None,
            card_vas_alias: default_card_vas_alias(),
        }
    }
}

impl ProviderConfig {
    /// Base URL requests are joined onto
    pub fn base_url(&self) -> &str {
        match (&self.proxy, &self.proxy_origin) {
            (true, Some(origin)) => origin,
            _ => &self.api_url,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Payment terminal used to pay for card orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_terminal_id")]
    pub terminal_id: String,
    /// ISO 4217 numeric code of the payment sum
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Funding account the payment is debited from
    #[serde(default = "default_currency")]
    pub account_id: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        PaymentConfig {
            terminal_id: default_terminal_id(),
            currency: default_currency(),
            account_id: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the persisted token and person id
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: default_storage_path(),
        }
    }
}

fn default_api_url() -> String {
    "https://edge.qiwi.com".to_string()
}

fn default_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_card_vas_alias() -> String {
    "qvc-master".to_string()
}

fn default_terminal_id() -> String {
    "32064".to_string()
}

fn default_currency() -> String {
    "643".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("vcard-session.json")
}
