// # reqwest Appliance Transport
//
// This crate provides the production `ApplianceTransport` for fortisync: an
// HTTPS client for the appliance's REST API.
//
// ## Behavior
//
// - ✅ One HTTP request per `send()` call
// - ✅ Bearer token authentication on every request
// - ✅ Explicit per-request timeout (from `ApplianceConfig::timeout_secs`)
// - ✅ TLS certificate verification, switchable off for self-signed appliances
// - ✅ Path segments percent-encoded individually (zone names go in the path)
// - ❌ NO status interpretation (the pipeline stages decide what a status means)
// - ❌ NO retry logic (the PUT → POST fallback is the publisher's, and it is the only one)
//
// ## Security Requirements
//
// - API key NEVER appears in logs or `Debug` output
// - Disabling TLS verification is logged as a warning every time a transport is built

use async_trait::async_trait;
use fortisync_core::config::ApplianceConfig;
use fortisync_core::traits::{ApiRequest, ApiResponse, ApplianceTransport, Method, TransportError};
use fortisync_core::{Error, Result};
use reqwest::Url;
use reqwest::header::ACCEPT;

/// HTTPS transport to one appliance
pub struct ReqwestTransport {
    /// `https://host:port/`
    base_url: Url,

    /// `host:port`, for log lines
    target: String,

    /// REST API bearer token
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Whether the appliance's certificate is verified
    verify_tls: bool,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<REDACTED>")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl ReqwestTransport {
    /// Create a transport for the configured appliance
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the API key is empty, the host does not form a
    /// valid URL, or the HTTP client cannot be built.
    pub fn new(config: &ApplianceConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(Error::config("Appliance API key is required"));
        }

        let base_url = base_url(&config.host, config.port)?;

        if !config.verify_tls {
            tracing::warn!(
                "TLS certificate verification is DISABLED for {}; the API key can be intercepted",
                config.host
            );
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            target: format!("{}:{}", config.host, config.port),
            api_key: config.api_key.clone(),
            verify_tls: config.verify_tls,
            client,
        })
    }

    /// Full URL for a request
    pub fn url_for(&self, request: &ApiRequest) -> std::result::Result<Url, TransportError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| TransportError::new(format!("{} cannot carry a path", self.base_url)))?
            .clear()
            .extend(&request.segments);

        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        Ok(url)
    }
}

/// `https://host:port/`, bracketing IPv6 literals
fn base_url(host: &str, port: u16) -> Result<Url> {
    let host = host.trim();
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };

    Url::parse(&format!("https://{}/", authority))
        .map_err(|e| Error::config(format!("Invalid appliance host '{}': {}", host, e)))
}

/// Render an error with its whole source chain
///
/// reqwest's top-level message ("error sending request") hides the cause an
/// operator needs (refused, timed out, certificate rejected).
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[async_trait]
impl ApplianceTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
        };

        tracing::debug!("{} {}", request.method, url.path());

        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key);

        if request.method == Method::Get {
            builder = builder.header(ACCEPT, "application/json");
        }

        // Sets Content-Type: application/json
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(error_chain(&e)))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            TransportError::new(format!("Failed to read response body: {}", error_chain(&e)))
        })?;

        tracing::debug!("{} {} -> {}", request.method, request.path(), status);

        Ok(ApiResponse { status, body })
    }

    fn target(&self) -> &str {
        &self.target
    }
}
