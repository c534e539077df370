//! Error types for the sync pipeline
//!
//! Every failure aborts the current run. Variants carry the raw upstream
//! response text or transport error verbatim so an operator can tell an
//! authorization failure from a shape mismatch or an appliance-side rejection.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the sync pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or invalid configuration, raised before the pipeline starts
    #[error("Configuration error: {0}")]
    Config(String),

    /// The DHCP monitor read failed or returned an unexpected shape
    #[error("DHCP fetch failed: {0}")]
    Fetch(String),

    /// The appliance reported an address family with no DNS record type
    #[error("Cannot map address type '{0}' to a DNS record type")]
    UnsupportedAddressType(String),

    /// Both the PUT and the POST of the zone record set failed
    #[error(
        "Failed to upload DNS records to zone '{zone}'\nPUT request failed with response: {put}\nPOST request failed with response: {post}"
    )]
    Publish {
        /// Target zone name
        zone: String,
        /// Raw result of the PUT attempt
        put: String,
        /// Raw result of the POST attempt
        post: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create an unsupported address type error
    pub fn unsupported_address_type(value: impl Into<String>) -> Self {
        Self::UnsupportedAddressType(value.into())
    }

    /// Create a publish error from the two failed attempts
    pub fn publish(
        zone: impl Into<String>,
        put: impl Into<String>,
        post: impl Into<String>,
    ) -> Self {
        Self::Publish {
            zone: zone.into(),
            put: put.into(),
            post: post.into(),
        }
    }

    /// Whether this error was raised before any network call
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
