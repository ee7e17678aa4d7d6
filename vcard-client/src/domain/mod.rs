pub mod error;
pub mod request;
pub mod traits;

pub use error::{ApiError, INTERNAL_ERROR_MESSAGE, TOKEN_EXPIRED_MESSAGE};
pub use request::{
    ApiRequest, Blob, HttpMethod, JSON_CONTENT_TYPE, PDF_CONTENT_TYPE, ResponseBody, ResponseKind,
};
pub use traits::{KeyValueStore, NotificationKind, Notifier, RequestExecutor, StorageError};
