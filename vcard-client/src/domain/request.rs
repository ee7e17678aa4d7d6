//! Transport-neutral description of one provider call.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use super::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// How a successful response body should be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    /// Binary document (statements); switches the request to PDF content negotiation
    Blob,
    Bytes,
    Text,
}

impl ResponseKind {
    /// Value for both `Content-Type` and `Accept`
    pub fn content_type(&self) -> &'static str {
        match self {
            ResponseKind::Blob => PDF_CONTENT_TYPE,
            _ => JSON_CONTENT_TYPE,
        }
    }
}

#[derive(Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    /// Bearer token; requests without one are refused before sending
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            kind: ResponseKind::Json,
            headers: Vec::new(),
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn expect(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Token to send, if present and non-blank
    pub fn token(&self) -> Option<&str> {
        self.bearer.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("kind", &self.kind)
            .field("has_body", &self.body.is_some())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Successful response, decoded according to the request's [`ResponseKind`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Empty bodies decode as `Value::Null`
    Json(Value),
    Blob(Blob),
    Bytes(Vec<u8>),
    Text(String),
}

impl ResponseBody {
    /// Deserialize a JSON body into `T`
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::Transport(format!("Unexpected response shape: {}", e))),
            other => Err(ApiError::Transport(format!(
                "Expected a JSON body, got {}",
                other.kind_name()
            ))),
        }
    }

    pub fn into_blob(self) -> Result<Blob, ApiError> {
        match self {
            ResponseBody::Blob(blob) => Ok(blob),
            ResponseBody::Bytes(bytes) => Ok(Blob {
                content_type: None,
                bytes,
            }),
            other => Err(ApiError::Transport(format!(
                "Expected a binary body, got {}",
                other.kind_name()
            ))),
        }
    }

    pub fn into_text(self) -> Result<String, ApiError> {
        match self {
            ResponseBody::Text(text) => Ok(text),
            ResponseBody::Json(value) => Ok(value.to_string()),
            other => Err(ApiError::Transport(format!(
                "Expected a text body, got {}",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            ResponseBody::Json(_) => "JSON",
            ResponseBody::Blob(_) => "blob",
            ResponseBody::Bytes(_) => "bytes",
            ResponseBody::Text(_) => "text",
        }
    }
}
