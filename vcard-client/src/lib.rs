//! Virtual card wallet client
//!
//! Talks to the payment provider's REST API on behalf of a single user:
//! verifies the bearer token, lists and manages virtual cards, orders new
//! ones, and reads payment history, totals, balances and statements.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Provider                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐  │
//! │  │ CardService │  │OrderService │  │HistoryService│  │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘  │
//! │         └────────────────┼────────────────┘          │
//! │                          ▼                           │
//! │                  ┌──────────────┐                    │
//! │                  │   Session    │──▶ KeyValueStore   │
//! │                  │ token, person│──▶ Notifier        │
//! │                  └──────┬───────┘                    │
//! └─────────────────────────┼────────────────────────────┘
//!                           │ RequestExecutor
//!                           ▼
//!                    ┌─────────────┐
//!                    │ RestClient  │──▶ provider / proxy
//!                    └─────────────┘
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export key types
pub use domain::{
    ApiError, ApiRequest, Blob, HttpMethod, KeyValueStore, NotificationKind, Notifier,
    RequestExecutor, ResponseBody, ResponseKind, StorageError,
};

pub use application::{
    CardService, HistoryService, OrderError, OrderService, Provider, Session, Statement,
};

pub use infrastructure::{
    InMemoryStore, JsonFileStore, LogNotifier, RecordingNotifier, RestClient, RestError,
};

pub use config::{
    ClientConfigFile, ConfigError, PaymentConfig, ProviderConfig, StorageConfig, load_config,
    load_config_from_str, load_default_config,
};
