use thiserror::Error;
use vcard_core::{OrderStatus, OrderStep};

/// Failure of a provider call, as seen by the rest of the client
///
/// Infrastructure errors are converted into this type so callers never see
/// transport details.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network failure, or a body that could not be decoded
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider rejected the request with a structured error
    #[error("{service} rejected the request (HTTP {status}): {message}")]
    RemoteService {
        status: u16,
        service: String,
        message: String,
    },

    /// An order step answered with an unexpected status
    #[error("Order {step} step returned {actual}, expected {expected}")]
    WorkflowStepMismatch {
        step: OrderStep,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// No token, or the provider rejected it during verification
    #[error("Session token is missing or was rejected")]
    AuthInvalid,

    /// The request was refused before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal application error occurred";
pub const TOKEN_EXPIRED_MESSAGE: &str = "The token has expired, enter a current token";

impl ApiError {
    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            ApiError::RemoteService { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            ApiError::RemoteService { service, .. } => {
                format!("The request was rejected by {}", service)
            }
            ApiError::WorkflowStepMismatch { step, .. } => {
                format!("The card order could not be completed ({} step)", step)
            }
            ApiError::AuthInvalid => TOKEN_EXPIRED_MESSAGE.to_string(),
            ApiError::InvalidRequest(msg) => msg.clone(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::AuthInvalid)
    }
}

impl From<vcard_core::FilterError> for ApiError {
    fn from(err: vcard_core::FilterError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}
