// # fortisync-core
//
// Core library syncing an appliance's DHCP leases into its own DNS zone
// database, so DHCP-assigned hostnames resolve by name.
//
// ## Architecture Overview
//
// A run is a three-stage pipeline over one appliance and one zone:
// - **DhcpFetcher**: one read of the DHCP monitor, filtered to leases with a hostname
// - **transform**: pure mapping to a sorted, numbered `dns-entry` record set
// - **ZonePublisher**: PUT the record set, falling back to POST once
// - **SyncPipeline**: sequences the stages and owns the run's outcome
//
// All network I/O goes through the **ApplianceTransport** trait; the
// production implementation lives in `fortisync-http`.
//
// ## Design Principles
//
// 1. **Stateless**: nothing is kept between runs; each run replaces the whole zone
// 2. **Fail whole**: any stage failure aborts the run before the zone is touched
// 3. **Deterministic**: identical leases always produce an identical upload
// 4. **Library-First**: the runner binary only resolves configuration

pub mod config;
pub mod error;
pub mod fetcher;
pub mod model;
pub mod pipeline;
pub mod publisher;
pub mod traits;
pub mod transform;

// Re-export core types for convenience
pub use config::{ApplianceConfig, SyncConfig};
pub use error::{Error, Result};
pub use fetcher::DhcpFetcher;
pub use model::{AddressType, DhcpClientRecord, DnsEntry, DnsRecordSet, DnsRecordType};
pub use pipeline::{PipelineEvent, SyncPipeline, SyncReport};
pub use publisher::{PublishOutcome, ZonePublisher};
pub use traits::{ApiRequest, ApiResponse, ApplianceTransport, Method, TransportError};
pub use transform::transform;
