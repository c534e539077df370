//! Core traits for the sync pipeline
//!
//! - [`ApplianceTransport`]: issue one REST call against the appliance

pub mod transport;

pub use transport::{ApiRequest, ApiResponse, ApplianceTransport, Method, TransportError};
