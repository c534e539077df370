// # Appliance Transport Trait
//
// Defines the HTTP capability the pipeline stages use to talk to the
// appliance's REST API.
//
// ## Implementations
//
// - reqwest: `fortisync-http` crate
//
// ## Usage
//
// ```rust,ignore
// use fortisync_core::traits::{ApiRequest, ApplianceTransport};
//
// let request = ApiRequest::get(["api", "v2", "monitor", "system", "dhcp"])
//     .with_query("vdom", "root");
// let response = transport.send(request).await?;
// println!("{} {}", response.status, response.body);
// ```

use async_trait::async_trait;
use std::fmt;

/// HTTP method used by the appliance API calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One REST call against the appliance
///
/// The path is kept as segments so the transport can percent-encode each one
/// (zone names end up in the path). Host, port, scheme and authentication are
/// the transport's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path segments below the API root, e.g. `["api", "v2", "monitor", ...]`
    pub segments: Vec<String>,
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// JSON body, sent with `Content-Type: application/json`
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request with no query and no body
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::Get, segments)
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Same resource, query and body with a different method
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// The unencoded path, e.g. `/api/v2/monitor/system/dhcp`
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }

    /// Value of the first query parameter named `key`
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of an API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, undecoded
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response (DNS, connect, TLS, timeout)
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Trait for appliance transport implementations
///
/// A transport executes exactly one HTTP request per call and reports what
/// came back. It does not interpret status codes, retry, or cache anything;
/// the pipeline stages decide what a response means.
///
/// # Security
///
/// Implementations hold the API bearer token and must never log it or expose
/// it through `Debug`.
#[async_trait]
pub trait ApplianceTransport: Send + Sync {
    /// Send one request
    ///
    /// # Returns
    ///
    /// - `Ok(ApiResponse)`: any HTTP response, whatever its status
    /// - `Err(TransportError)`: no response was received
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;

    /// The appliance this transport talks to, for log lines
    fn target(&self) -> &str;
}
