//! Retrying HTTP client

use crate::schema::ErrorResponse;
use envlift_core::{
    Error, Result, CLIENT_SDK, CLIENT_VERSION, DEFAULT_REQUEST_TIMEOUT, REQUEST_ID_HEADER,
};
use envlift_utils::{retry, Attempt, RetryPolicy, StatusClass};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use std::time::Duration;
use url::Url;

const JSON: &str = "application/json";

/// Transport settings for an [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://api.envlift.io`
    pub host: String,
    /// When false, self-signed and otherwise invalid certificates are accepted
    pub verify_tls: bool,
    /// Per-request deadline; `None` disables it
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            verify_tls: true,
            timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// A request relative to the configured host
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Authenticate with an API token
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub request_id: Option<String>,
}

/// HTTP client with bounded retry
///
/// Transport errors are returned immediately as [`Error::Network`]. Responses
/// are classified by the retry policy; once the loop ends on anything other
/// than a 2xx the final body is decoded into an [`Error::Api`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = parse_host(&config.host)?;

        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(!config.verify_tls);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if !config.verify_tls {
            tracing::warn!(host = %base_url, "TLS certificate verification is disabled");
        }

        let http = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn get(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute(ApiRequest {
            method: Method::GET,
            ..request
        })
        .await
    }

    pub async fn post(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute(ApiRequest {
            method: Method::POST,
            ..request
        })
        .await
    }

    pub async fn delete(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.execute(ApiRequest {
            method: Method::DELETE,
            ..request
        })
        .await
    }

    /// Send `request`, retrying transient statuses per the configured policy
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint(&request.path, &request.query)?;
        let headers = build_headers(&request.headers)?;
        let endpoint = url.as_str().to_string();

        let outcome = retry(&self.config.retry, |attempt| {
            let mut builder = self
                .http
                .request(request.method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }
            let endpoint = endpoint.as_str();
            let policy = &self.config.retry;

            async move {
                tracing::debug!(attempt, endpoint, "sending request");
                let response = builder
                    .send()
                    .await
                    .map_err(|e| Error::network(endpoint, describe_transport_error(&e)))?;

                let status = response.status().as_u16();
                let request_id = response
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                if let Some(request_id) = &request_id {
                    tracing::debug!(attempt, status, request_id = %request_id, "received response");
                } else {
                    tracing::debug!(attempt, status, "received response");
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| Error::network(endpoint, describe_transport_error(&e)))?
                    .to_vec();

                let response = ApiResponse {
                    status,
                    body,
                    request_id,
                };
                Ok(match policy.classify(status) {
                    StatusClass::Success => Attempt::Success(response),
                    StatusClass::Retryable => Attempt::Retry(response),
                    StatusClass::Terminal => Attempt::Stop(response),
                })
            }
        })
        .await?;

        if outcome.succeeded {
            Ok(outcome.value)
        } else {
            tracing::debug!(
                status = outcome.value.status,
                attempts = outcome.attempts,
                "request failed"
            );
            Err(api_error(outcome.value))
        }
    }

    fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| Error::configuration(format!("invalid request path '{path}': {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

fn parse_host(host: &str) -> Result<Url> {
    let url = Url::parse(host)
        .map_err(|e| Error::configuration(format!("invalid api-host '{host}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::configuration(format!(
            "invalid api-host '{host}': expected an http or https URL"
        )));
    }
    Ok(url)
}

/// The caller's headers, overlaid with the fixed identification headers.
/// Only a caller-supplied `Accept` survives.
fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::configuration(format!("invalid header name '{name}': {e}")))?;
        let mut value = header_value(value)?;
        if name == AUTHORIZATION {
            value.set_sensitive(true);
        }
        headers.insert(name, value);
    }

    headers.insert("client-sdk", HeaderValue::from_static(CLIENT_SDK));
    headers.insert("client-version", HeaderValue::from_static(CLIENT_VERSION));
    headers.insert(
        USER_AGENT,
        header_value(&format!("{CLIENT_SDK}/{CLIENT_VERSION}"))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));

    if !headers.contains_key(ACCEPT) {
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
    }
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::configuration("header value contains invalid characters"))
}

/// Build the error for a final non-2xx response.
///
/// The body is kept only when it decodes as an error response; its `messages`
/// are joined with newlines.
fn api_error(response: ApiResponse) -> Error {
    match serde_json::from_slice::<ErrorResponse>(&response.body) {
        Ok(parsed) => Error::api(response.status, parsed.message(), Some(response.body)),
        Err(_) => Error::api(response.status, "unable to parse error response", None),
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "request timed out".to_string();
    }
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_must_be_http_url() {
        for host in ["api.envlift.io", "ftp://api.envlift.io", "mailto:ops@envlift.io", ""] {
            let err = ApiClient::new(ClientConfig::new(host)).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }), "{host}");
        }
        assert!(ApiClient::new(ClientConfig::new("http://localhost:8080")).is_ok());
    }

    #[test]
    fn test_endpoint_joins_path_and_query() {
        let client = ApiClient::new(ClientConfig::new("https://api.envlift.io/")).unwrap();
        let url = client
            .endpoint(
                "/v2/variables",
                &[("project".to_string(), "my app".to_string())],
            )
            .unwrap();
        assert_eq!(url.as_str(), "https://api.envlift.io/v2/variables?project=my+app");

        let client = ApiClient::new(ClientConfig::new("https://proxy.local/envlift")).unwrap();
        let url = client.endpoint("/v2/variables", &[]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.local/envlift/v2/variables");
    }

    #[test]
    fn test_caller_accept_is_kept() {
        let headers =
            build_headers(&[("Accept".to_string(), "text/plain".to_string())]).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "text/plain");
        assert_eq!(headers.get("client-sdk").unwrap(), CLIENT_SDK);

        let headers = build_headers(&[]).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), JSON);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON);
    }

    #[test]
    fn test_identification_headers_cannot_be_overridden() {
        let headers = build_headers(&[
            ("Content-Type".to_string(), "text/plain".to_string()),
            ("client-sdk".to_string(), "spoofed".to_string()),
            ("client-version".to_string(), "0.0.0".to_string()),
            ("User-Agent".to_string(), "curl/8.0".to_string()),
            ("x-trace".to_string(), "abc".to_string()),
        ])
        .unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON);
        assert_eq!(headers.get("client-sdk").unwrap(), CLIENT_SDK);
        assert_eq!(headers.get("client-version").unwrap(), CLIENT_VERSION);
        assert_eq!(
            headers.get(USER_AGENT).unwrap().to_str().unwrap(),
            format!("{CLIENT_SDK}/{CLIENT_VERSION}")
        );
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[test]
    fn test_authorization_header_is_sensitive() {
        let headers = build_headers(&[(
            "Authorization".to_string(),
            "Bearer secret".to_string(),
        )])
        .unwrap();
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_api_error_joins_messages() {
        let body = br#"{"messages":["first","second"],"success":false}"#.to_vec();
        match api_error(ApiResponse {
            status: 401,
            body: body.clone(),
            request_id: None,
        }) {
            Error::Api {
                status,
                message,
                body: kept,
            } => {
                assert_eq!(status, 401);
                assert_eq!(message, "first\nsecond");
                assert_eq!(kept, Some(body));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_without_parsable_body() {
        match api_error(ApiResponse {
            status: 502,
            body: b"<html>bad gateway</html>".to_vec(),
            request_id: None,
        }) {
            Error::Api { status, body, .. } => {
                assert_eq!(status, 502);
                assert!(body.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
