//! HTTP transport with outcome classification
//!
//! A [`Transport`] performs exactly one request/response exchange and
//! classifies the outcome; it never retries. Retry and polling decisions
//! belong to the collector. The trait is object-safe so tests can script a
//! stub transport.

use crate::backoff::IsRetryable;
use crate::error::{Error, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// HTTP method for an API request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
}

/// A single request against the collection API
///
/// The path is joined onto the transport's base URL; authorization and
/// content-type headers are the transport's responsibility.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API base URL, e.g. `trigger`
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Optional JSON request body
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// A GET request for `path` with the given query parameters
    pub fn get(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query,
            body: None,
        }
    }
}

/// One request/response exchange with the collection API
///
/// On success the parsed JSON body of a 2xx response is returned. Every
/// failure mode is classified into a [`TransportError`] variant so callers
/// can make policy decisions without inspecting HTTP details.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, TransportError>;
}

/// Production transport backed by `reqwest`
///
/// Holds the bearer credential and enforces the configured per-request
/// timeout on every call. Cheap to share: the inner client is already
/// reference-counted.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `base_url`, presenting `api_token` as a
    /// bearer credential
    ///
    /// A blank token or an unparseable base URL is a construction-time
    /// [`Error::Config`]; no operation is possible without a credential.
    pub fn new(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::Config {
                message: "API token is required".to_string(),
                key: Some("api_token".to_string()),
            });
        }

        let base_url = base_url.into();
        if let Err(e) = Url::parse(&base_url) {
            return Err(Error::Config {
                message: format!("invalid API base URL {base_url:?}: {e}"),
                key: Some("api_base_url".to_string()),
            });
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, TransportError> {
        let url = format!("{}/{}", self.base_url, request.path.trim_start_matches('/'));

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };

        builder = builder
            .bearer_auth(&self.api_token)
            .query(&request.query)
            .timeout(self.timeout);

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = ?request.method, url = %url, "sending API request");

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Network(e)
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(TransportError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Network(e)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        // Only rate limiting earns a backoff-and-retry; other failures are
        // surfaced to the caller on first occurrence.
        matches!(self, TransportError::RateLimited)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_is_a_construction_error() {
        let result = HttpTransport::new("   ", "https://api.example.com/v3", Duration::from_secs(30));
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("api_token")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_base_url_is_a_construction_error() {
        let result = HttpTransport::new("token", "not a url", Duration::from_secs(30));
        match result {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("api_base_url")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn trailing_slash_on_base_url_is_normalized() {
        let transport = HttpTransport::new(
            "token",
            "https://api.example.com/v3/",
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(transport.base_url, "https://api.example.com/v3");
    }

    #[test]
    fn only_rate_limited_is_retryable() {
        assert!(TransportError::RateLimited.is_retryable());
        assert!(!TransportError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(
            !TransportError::Http {
                status: 500,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[tokio::test]
    async fn classifies_429_as_rate_limited() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/trigger"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new("token", server.uri(), Duration::from_secs(5)).unwrap();
        let result = transport
            .send(ApiRequest {
                method: Method::Post,
                path: "trigger".into(),
                query: vec![],
                body: Some(serde_json::json!([])),
            })
            .await;

        assert!(matches!(result, Err(TransportError::RateLimited)));
    }

    #[tokio::test]
    async fn classifies_other_4xx_with_status_and_body() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/progress/s_1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new("token", server.uri(), Duration::from_secs(5)).unwrap();
        let result = transport.send(ApiRequest::get("progress/s_1", vec![])).await;

        match result {
            Err(TransportError::Http { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_bearer_authorization_and_query() {
        use wiremock::matchers::{header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/snapshot/s_1"))
            .and(query_param("format", "json"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new("secret-token", server.uri(), Duration::from_secs(5)).unwrap();
        let body = transport
            .send(ApiRequest::get(
                "snapshot/s_1",
                vec![("format".into(), "json".into())],
            ))
            .await
            .unwrap();

        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unparseable_success_body_is_a_body_error() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/progress/s_1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new("token", server.uri(), Duration::from_secs(5)).unwrap();
        let result = transport.send(ApiRequest::get("progress/s_1", vec![])).await;

        assert!(matches!(result, Err(TransportError::Body(_))));
    }
}
