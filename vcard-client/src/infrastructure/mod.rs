pub mod dto;
pub mod notifier;
pub mod rest_client;
pub mod storage;

pub use notifier::{LogNotifier, RecordingNotifier};
pub use rest_client::{RestClient, RestError};
pub use storage::{InMemoryStore, JsonFileStore};
