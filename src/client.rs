//! Resilient HTTP request client.
//!
//! One [`ApiClient`] per logical API surface: it owns the connection and
//! cookie state, the base URL and the authorization header for its lifetime.
//! Retry budget is consumed only by transport faults; any received HTTP
//! response, error statuses included, is returned to the caller as-is.

use std::fmt;
use std::time::Duration;

use reqwest::{header, Method};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{ClientOptions, HarnessError, Result};

/// One HTTP request, constructed fresh per call.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, or a path resolved against the client's base URL.
    /// An empty path targets the base URL itself.
    pub path: String,
    /// Query parameters; repeated names are sent repeatedly.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub json: Option<serde_json::Value>,
    /// Extra headers for this request only.
    pub headers: Vec<(String, String)>,
    /// Per-call timeout override in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Per-call retry budget override (total attempts).
    pub retry_budget: Option<usize>,
}

impl RequestSpec {
    /// Builds a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            json: None,
            headers: Vec::new(),
            timeout_ms: None,
            retry_budget: None,
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Appends one query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Appends one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the client timeout for this call.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Overrides the client retry budget for this call.
    pub fn retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = Some(retry_budget);
        self
    }
}

/// Undecoded HTTP response: status, headers and body text.
#[derive(Clone, Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: header::HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            HarnessError::Decode(format!("invalid response JSON: {err}; body: {}", self.body))
        })
    }

    /// Asserts status 200 and decodes the body as opaque JSON.
    ///
    /// Any other status becomes [`HarnessError::UnexpectedStatus`] carrying
    /// the observed code and body for diagnosis.
    pub fn expect_ok(self) -> Result<serde_json::Value> {
        self.expect_ok_as()
    }

    /// Asserts status 200 and decodes the body into `T`.
    pub fn expect_ok_as<T: DeserializeOwned>(self) -> Result<T> {
        if self.status != 200 {
            return Err(HarnessError::UnexpectedStatus {
                status: self.status,
                body: self.body,
            });
        }
        self.json()
    }
}

#[derive(Clone)]
/// HTTP client for one API surface, with bounded retry on transport faults.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    authorization: Option<String>,
    options: ClientOptions,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("options", &self.options)
            .finish()
    }
}

impl ApiClient {
    /// Creates an unauthenticated client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: session_client(),
            base_url: base_url.into(),
            authorization: None,
            options: ClientOptions::default(),
        }
    }

    /// Creates a client sending a raw `Authorization` header value on every
    /// request.
    ///
    /// Example: `"Token <token>"` or any custom scheme.
    pub fn with_authorization(
        base_url: impl Into<String>,
        authorization: impl Into<String>,
    ) -> Self {
        let mut client = Self::new(base_url);
        client.authorization = Some(authorization.into());
        client
    }

    /// Creates a client from an access token.
    ///
    /// A bare token gets the upstream's `Token ` scheme prefix; a value that
    /// already carries a scheme is sent unchanged.
    pub fn with_token(base_url: impl Into<String>, token: impl AsRef<str>) -> Self {
        let authorization = normalize_token_authorization(token.as_ref());
        Self::with_authorization(base_url, authorization)
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Sends the request, retrying transport faults up to the retry budget.
    ///
    /// Any received HTTP response is returned immediately without consuming
    /// budget, 4xx/5xx included; the caller decides what a status means.
    /// When every attempt faults, the final failure surfaces as
    /// [`HarnessError::RequestFailed`] with the attempt count and last cause.
    ///
    /// Only faults during send are retried: once headers have arrived the
    /// attempt is final, and a failure while reading the body surfaces as
    /// [`HarnessError::RequestFailed`] with the attempts made so far.
    pub async fn send(&self, spec: RequestSpec) -> Result<RawResponse> {
        let url = self.resolve_url(&spec.path);
        let timeout = Duration::from_millis(spec.timeout_ms.unwrap_or(self.options.timeout_ms));
        let budget = spec.retry_budget.unwrap_or(self.options.retry_budget).max(1);

        let mut attempt = 0usize;
        loop {
            attempt += 1;
            let mut request = self.http.request(spec.method.clone(), &url).timeout(timeout);
            if !spec.query.is_empty() {
                request = request.query(&spec.query);
            }
            if let Some(authorization) = &self.authorization {
                request = request.header(header::AUTHORIZATION, authorization);
            }
            for (name, value) in &spec.headers {
                request = request.header(name, value);
            }
            if let Some(body) = &spec.json {
                request = request.json(body);
            }

            tracing::debug!(
                method = %spec.method,
                url = %url,
                attempt,
                budget,
                "sending request"
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let headers = response.headers().clone();
                    let body = response
                        .text()
                        .await
                        .map_err(|source| HarnessError::RequestFailed {
                            attempts: attempt,
                            source,
                        })?;
                    tracing::debug!(status, attempt, body_len = body.len(), "response received");
                    return Ok(RawResponse {
                        status,
                        headers,
                        body,
                    });
                }
                Err(source) => {
                    tracing::warn!(error = %source, attempt, budget, "transport fault");
                    if attempt >= budget {
                        return Err(HarnessError::RequestFailed {
                            attempts: attempt,
                            source,
                        });
                    }
                    sleep(Duration::from_millis(self.options.retry_delay_ms)).await;
                }
            }
        }
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn session_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("TLS backend must initialize")
}

fn normalize_token_authorization(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.contains(' ') {
        trimmed.to_owned()
    } else {
        format!("Token {trimmed}")
    }
}
