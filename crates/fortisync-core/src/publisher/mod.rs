//! Zone publisher
//!
//! Replaces a DNS database zone's record set with a PUT, falling back to a
//! POST when the PUT is not accepted. The appliance models "update existing
//! zone" as PUT and "create zone" as POST; existence is not checked first.
//!
//! ## API Calls
//!
//! ```http
//! PUT /api/v2/cmdb/system/dns-database/:zone?vdom=root
//! Authorization: Bearer <token>
//! Content-Type: application/json
//!
//! { "dns-entry": [ ... ] }
//!
//! # only if the PUT did not return 200
//! POST /api/v2/cmdb/system/dns-database/:zone?vdom=root
//! ```
//!
//! Exactly these two attempts are made; there is no retry loop and no backoff.

use crate::error::{Error, Result};
use crate::model::DnsRecordSet;
use crate::traits::{ApiRequest, ApiResponse, ApplianceTransport, Method, TransportError};
use tracing::{debug, warn};

/// Path of the DNS database configuration table
pub const DNS_DATABASE_PATH: [&str; 5] = ["api", "v2", "cmdb", "system", "dns-database"];

/// The only status the configuration API uses for an accepted write
const STATUS_OK: u16 = 200;

/// How the record set was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The PUT replaced an existing zone's record set
    Replaced,
    /// The PUT was rejected and the POST created the zone
    Created,
}

impl PublishOutcome {
    /// HTTP method of the accepted attempt
    pub fn method(&self) -> Method {
        match self {
            PublishOutcome::Replaced => Method::Put,
            PublishOutcome::Created => Method::Post,
        }
    }
}

/// Uploads record sets to one zone of the DNS database
#[derive(Debug, Clone)]
pub struct ZonePublisher {
    /// Zone name
    zone: String,
    /// Virtual domain holding the zone
    vdom: String,
}

impl ZonePublisher {
    /// Create a publisher for the given zone
    pub fn new(zone: impl Into<String>, vdom: impl Into<String>) -> Self {
        Self {
            zone: zone.into(),
            vdom: vdom.into(),
        }
    }

    /// Zone this publisher writes to
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Virtual domain the zone lives in
    pub fn vdom(&self) -> &str {
        &self.vdom
    }

    /// The write request for `record_set` with the given method
    pub fn request(&self, method: Method, record_set: &DnsRecordSet) -> Result<ApiRequest> {
        let body = serde_json::to_value(record_set).map_err(|e| {
            let detail = format!("request body could not be encoded: {}", e);
            Error::publish(&self.zone, detail.clone(), detail)
        })?;

        Ok(ApiRequest::new(
            method,
            DNS_DATABASE_PATH
                .iter()
                .copied()
                .chain(std::iter::once(self.zone.as_str())),
        )
        .with_query("vdom", self.vdom.as_str())
        .with_body(body))
    }

    /// Replace the zone's record set
    ///
    /// # Returns
    ///
    /// - `Ok(PublishOutcome)`: which attempt was accepted
    /// - `Err(Error::Publish)`: neither attempt returned 200; carries both
    ///   raw responses (or transport errors)
    pub async fn publish(
        &self,
        transport: &dyn ApplianceTransport,
        record_set: &DnsRecordSet,
    ) -> Result<PublishOutcome> {
        let put = self.request(Method::Put, record_set)?;
        let post = put.clone().with_method(Method::Post);

        debug!(
            "Uploading {} entr(y/ies) to zone '{}' on {}",
            record_set.len(),
            self.zone,
            transport.target()
        );

        let put_result = transport.send(put).await;
        if accepted(&put_result) {
            return Ok(PublishOutcome::Replaced);
        }

        warn!(
            "PUT to zone '{}' was not accepted ({}), falling back to POST",
            self.zone,
            describe(&put_result)
        );

        let post_result = transport.send(post).await;
        if accepted(&post_result) {
            return Ok(PublishOutcome::Created);
        }

        Err(Error::publish(
            &self.zone,
            describe(&put_result),
            describe(&post_result),
        ))
    }
}

fn accepted(result: &std::result::Result<ApiResponse, TransportError>) -> bool {
    matches!(result, Ok(response) if response.status == STATUS_OK)
}

/// Render an attempt for diagnostics, keeping the raw body intact
fn describe(result: &std::result::Result<ApiResponse, TransportError>) -> String {
    match result {
        Ok(response) => format!("status {}: {}", response.status, response.body),
        Err(e) => format!("HTTP request failed: {}", e),
    }
}
