//! DHCP lease fetcher
//!
//! Reads the appliance's DHCP monitor once and keeps the leases that carry a
//! hostname, projected to [`DhcpClientRecord`].
//!
//! ## API Call
//!
//! ```http
//! GET /api/v2/monitor/system/dhcp?ipv6=true&vdom=root
//! Authorization: Bearer <token>
//! Accept: application/json
//! ```

use crate::error::{Error, Result};
use crate::model::DhcpClientRecord;
use crate::traits::{ApiRequest, ApplianceTransport};
use serde_json::Value;
use tracing::debug;

/// Path of the DHCP monitor resource
pub const DHCP_MONITOR_PATH: [&str; 5] = ["api", "v2", "monitor", "system", "dhcp"];

/// Reads DHCP leases from the appliance's monitor API
#[derive(Debug, Clone)]
pub struct DhcpFetcher {
    /// Include IPv6 leases
    ipv6: bool,
    /// Virtual domain to read from
    vdom: String,
}

impl DhcpFetcher {
    /// Create a fetcher for the given scope
    pub fn new(ipv6: bool, vdom: impl Into<String>) -> Self {
        Self {
            ipv6,
            vdom: vdom.into(),
        }
    }

    /// The monitor request this fetcher issues
    pub fn request(&self) -> ApiRequest {
        ApiRequest::get(DHCP_MONITOR_PATH)
            .with_query("ipv6", if self.ipv6 { "true" } else { "false" })
            .with_query("vdom", self.vdom.as_str())
    }

    /// Fetch the leases that carry a hostname
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DhcpClientRecord>)`: filtered records, in the appliance's order
    /// - `Err(Error::Fetch)`: transport failure, non-2xx status or unexpected
    ///   body; the raw body or transport error is carried verbatim
    pub async fn fetch(&self, transport: &dyn ApplianceTransport) -> Result<Vec<DhcpClientRecord>> {
        let request = self.request();
        debug!(
            "Reading DHCP leases from {}{} (ipv6: {}, vdom: {})",
            transport.target(),
            request.path(),
            self.ipv6,
            self.vdom
        );

        let response = transport
            .send(request)
            .await
            .map_err(|e| Error::fetch(format!("HTTP request failed: {}", e)))?;

        if !response.is_success() {
            return Err(Error::fetch(format!(
                "status {}: {}",
                response.status, response.body
            )));
        }

        parse_monitor_response(&response.body)
    }
}

/// Extract hostname-bearing leases from a DHCP monitor response body
///
/// Elements of `results` without a `hostname` key are skipped. A kept element
/// that lacks `ip`, `interface` or `type` as strings fails the whole parse,
/// since the record set would otherwise be silently incomplete.
pub fn parse_monitor_response(body: &str) -> Result<Vec<DhcpClientRecord>> {
    let json: Value = serde_json::from_str(body).map_err(|_| Error::fetch(body))?;

    let results = json
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::fetch(body))?;

    let mut records = Vec::with_capacity(results.len());
    for lease in results {
        let has_hostname = lease
            .as_object()
            .is_some_and(|obj| obj.contains_key("hostname"));
        if !has_hostname {
            continue;
        }

        let record: DhcpClientRecord =
            serde_json::from_value(lease.clone()).map_err(|_| Error::fetch(body))?;
        records.push(record);
    }

    debug!(
        "DHCP monitor returned {} lease(s), {} with a hostname",
        results.len(),
        records.len()
    );

    Ok(records)
}
