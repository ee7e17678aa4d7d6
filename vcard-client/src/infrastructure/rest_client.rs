use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use reqwest::{Client, Method};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, ProviderConfig};
use crate::domain::{
    ApiError, ApiRequest, Blob, HttpMethod, RequestExecutor, ResponseBody, ResponseKind,
};

#[derive(Error, Debug)]
pub enum RestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Service error from {service} (HTTP {status}): {message}")]
    Service {
        status: u16,
        service: String,
        message: String,
    },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    Url(String),
    #[error("Request has no bearer token")]
    MissingToken,
}

/// Convert infrastructure RestError to domain ApiError
impl From<RestError> for ApiError {
    fn from(err: RestError) -> Self {
        match err {
            RestError::Service {
                status,
                service,
                message,
            } => ApiError::RemoteService {
                status,
                service,
                message,
            },
            RestError::MissingToken => ApiError::AuthInvalid,
            RestError::Url(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

/// Error envelope the provider returns on rejected requests
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceErrorEnvelope {
    service_name: Option<String>,
    user_message: Option<String>,
    description: Option<String>,
}

/// REST client for the payment provider
///
/// Infrastructure component: builds URLs against the configured base (the
/// provider itself or a same-origin proxy), attaches the bearer token and
/// standard headers, and classifies failures.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    origin: String,
}

impl RestClient {
    pub fn new(base_url: Url, origin: impl Into<String>) -> Self {
        RestClient {
            client: Client::new(),
            base_url,
            origin: origin.into(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let raw = config.base_url();
        let base_url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(RestClient {
            client,
            base_url,
            origin: config.origin.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join the base URL with `path` and append the query parameters
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, RestError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url =
            Url::parse(&format!("{}/{}", base, path)).map_err(|e| RestError::Url(e.to_string()))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: ApiRequest) -> Result<ResponseBody, RestError> {
        let token = request.token().ok_or(RestError::MissingToken)?.to_string();
        let url = self.url_for(&request.path, &request.query)?;
        let content_type = request.kind.content_type();

        let mut builder = self
            .client
            .request(to_method(request.method), url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, content_type)
            .header(ORIGIN, &self.origin);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        tracing::debug!(method = %request.method, path = %request.path, "provider request");
        let resp = builder.send().await?;
        let status = resp.status();
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "provider response"
        );

        self.handle_response(resp, request.kind).await
    }

    async fn handle_response(
        &self,
        resp: reqwest::Response,
        kind: ResponseKind,
    ) -> Result<ResponseBody, RestError> {
        let status = resp.status().as_u16();

        if status >= 400 {
            let bytes = resp.bytes().await?;
            return Err(classify_failure(status, &bytes));
        }

        match kind {
            ResponseKind::Json => {
                let bytes = resp.bytes().await?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(ResponseBody::Json(serde_json::Value::Null));
                }
                serde_json::from_slice(&bytes)
                    .map(ResponseBody::Json)
                    .map_err(|e| RestError::Decode(e.to_string()))
            }
            ResponseKind::Blob => {
                let content_type = resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let bytes = resp.bytes().await?;
                Ok(ResponseBody::Blob(Blob {
                    content_type,
                    bytes: bytes.to_vec(),
                }))
            }
            ResponseKind::Bytes => Ok(ResponseBody::Bytes(resp.bytes().await?.to_vec())),
            ResponseKind::Text => Ok(ResponseBody::Text(resp.text().await?)),
        }
    }
}

/// Structured provider errors carry a `serviceName`; anything else is opaque
fn classify_failure(status: u16, body: &[u8]) -> RestError {
    match serde_json::from_slice::<ServiceErrorEnvelope>(body) {
        Ok(ServiceErrorEnvelope {
            service_name: Some(service),
            user_message,
            description,
        }) => RestError::Service {
            status,
            service,
            message: user_message.or(description).unwrap_or_default(),
        },
        _ => RestError::Status {
            status,
            body: String::from_utf8_lossy(body).chars().take(200).collect(),
        },
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Implement RequestExecutor for RestClient (Dependency Inversion)
///
/// Converts infrastructure RestError to domain ApiError so the application
/// layer never depends on reqwest.
#[async_trait]
impl RequestExecutor for RestClient {
    async fn execute(&self, request: ApiRequest) -> Result<ResponseBody, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        self.send(request).await.map_err(|err| {
            tracing::warn!(%method, %path, error = %err, "provider call failed");
            ApiError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(Url::parse(base).unwrap(), "http://localhost:3000")
    }

    #[test]
    fn test_url_join_normalizes_slashes() {
        let c = client("https://edge.example.com/");
        let url = c.url_for("/cards/v1/cards", &[]).unwrap();
        assert_eq!(url.as_str(), "https://edge.example.com/cards/v1/cards");

        let url = c.url_for("cards/v1/cards", &[]).unwrap();
        assert_eq!(url.as_str(), "https://edge.example.com/cards/v1/cards");
    }

    #[test]
    fn test_url_keeps_proxy_prefix() {
        let c = client("https://wallet.example.com/api");
        let url = c.url_for("/funding-sources/v2/persons/1/accounts", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://wallet.example.com/api/funding-sources/v2/persons/1/accounts"
        );
    }

    #[test]
    fn test_url_repeats_list_keys() {
        let c = client("https://edge.example.com");
        let query = vec![
            ("sources".to_string(), "QW_RUB".to_string()),
            ("sources".to_string(), "QW_USD".to_string()),
            ("startDate".to_string(), "2024-01-01T00:00:00+03:00".to_string()),
        ];
        let url = c.url_for("/payments", &query).unwrap();
        assert_eq!(
            url.query(),
            Some("sources=QW_RUB&sources=QW_USD&startDate=2024-01-01T00%3A00%3A00%2B03%3A00")
        );
    }

    #[test]
    fn test_classify_service_error() {
        let body = br#"{"serviceName":"cards","errorCode":"card.blocked","userMessage":"Card is blocked"}"#;
        match classify_failure(422, body) {
            RestError::Service {
                status,
                service,
                message,
            } => {
                assert_eq!(status, 422);
                assert_eq!(service, "cards");
                assert_eq!(message, "Card is blocked");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_unrecognized_error() {
        assert!(matches!(
            classify_failure(502, b"<html>Bad gateway</html>"),
            RestError::Status { status: 502, .. }
        ));
        assert!(matches!(
            classify_failure(400, br#"{"code": 1}"#),
            RestError::Status { .. }
        ));
    }

    #[test]
    fn test_rest_error_to_api_error() {
        let err: ApiError = RestError::MissingToken.into();
        assert_eq!(err, ApiError::AuthInvalid);

        let err: ApiError = RestError::Decode("eof".into()).into();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
