//! Configuration types for the sync pipeline
//!
//! The pipeline consumes already-resolved values. Reading them from the
//! environment or from secret files is the runner's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default HTTPS port of the appliance's REST API
pub const DEFAULT_PORT: u16 = 443;

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the appliance REST API
#[derive(Clone, Serialize, Deserialize)]
pub struct ApplianceConfig {
    /// Hostname or IP address of the appliance
    pub host: String,

    /// HTTPS port of the REST API
    #[serde(default = "default_port")]
    pub port: u16,

    /// Verify the appliance's TLS certificate
    ///
    /// Disabling this accepts any certificate the appliance presents,
    /// including self-signed ones, and leaves the API key exposed to anyone
    /// able to intercept the connection.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Virtual domain scoping every API call
    #[serde(default = "default_vdom")]
    pub vdom: String,

    /// REST API bearer token
    /// ⚠️ NEVER log this value
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Custom Debug implementation that hides the API key
impl fmt::Debug for ApplianceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplianceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("verify_tls", &self.verify_tls)
            .field("vdom", &self.vdom)
            .field("api_key", &"<REDACTED>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApplianceConfig {
    /// Create a configuration with defaults for everything but host and key
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            verify_tls: default_verify_tls(),
            vdom: default_vdom(),
            api_key: api_key.into(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the API port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    /// Set the virtual domain
    pub fn with_vdom(mut self, vdom: impl Into<String>) -> Self {
        self.vdom = vdom.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the connection settings
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("Appliance API key cannot be empty"));
        }
        if self.host.trim().is_empty() {
            return Err(crate::Error::config("Appliance host cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("Appliance port must be > 0"));
        }
        if self.vdom.is_empty() {
            return Err(crate::Error::config("VDOM cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Request timeout must be > 0"));
        }
        Ok(())
    }
}

/// Settings for one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Appliance connection settings
    pub appliance: ApplianceConfig,

    /// DNS database zone receiving the records
    pub zone: String,

    /// Include IPv6 leases in the DHCP monitor read
    #[serde(default = "default_ipv6")]
    pub ipv6: bool,

    /// TTL written on every entry; 0 defers to the zone default
    #[serde(default)]
    pub ttl: u32,

    /// Log the full record set before uploading it
    #[serde(default)]
    pub log_records: bool,
}

impl SyncConfig {
    /// Create a new configuration with defaults
    pub fn new(appliance: ApplianceConfig, zone: impl Into<String>) -> Self {
        Self {
            appliance,
            zone: zone.into(),
            ipv6: default_ipv6(),
            ttl: 0,
            log_records: false,
        }
    }

    /// Include or exclude IPv6 leases
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = ipv6;
        self
    }

    /// Set the entry TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable logging of the full record set
    pub fn with_log_records(mut self, log_records: bool) -> Self {
        self.log_records = log_records;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.appliance.validate()?;

        if self.zone.trim().is_empty() {
            return Err(crate::Error::config("DNS zone cannot be empty"));
        }

        Ok(())
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_verify_tls() -> bool {
    true
}

fn default_vdom() -> String {
    "root".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_ipv6() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_tls_and_root_vdom() {
        let config = ApplianceConfig::new("192.168.1.99", "key");
        assert!(config.verify_tls);
        assert_eq!(config.port, 443);
        assert_eq!(config.vdom, "root");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let config = SyncConfig::new(ApplianceConfig::new("fw", ""), "dhcp.internal");
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn empty_zone_is_rejected() {
        let config = SyncConfig::new(ApplianceConfig::new("fw", "key"), " ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let appliance = ApplianceConfig::new("fw", "key").with_timeout_secs(0);
        assert!(appliance.validate().is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: SyncConfig = serde_json::from_value(serde_json::json!({
            "appliance": { "host": "fw.lan", "api_key": "k" },
            "zone": "dhcp.internal"
        }))
        .unwrap();

        assert!(config.ipv6);
        assert_eq!(config.ttl, 0);
        assert!(!config.log_records);
        assert_eq!(config.appliance.port, 443);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn api_key_not_exposed_in_debug() {
        let config = SyncConfig::new(ApplianceConfig::new("fw", "secret_key_12345"), "z");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
