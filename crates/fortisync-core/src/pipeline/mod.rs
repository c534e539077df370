//! Sync pipeline
//!
//! The SyncPipeline runs one sync from start to finish:
//! - Reads DHCP leases via the [`DhcpFetcher`]
//! - Builds the zone record set with [`transform`]
//! - Uploads it via the [`ZonePublisher`]
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────┐
//!                  │ SyncPipeline │
//!                  └──────────────┘
//!                          │
//!      ┌───────────────────┼───────────────────┐
//!      │                   │                   │
//!      ▼                   ▼                   ▼
//! ┌─────────────┐   ┌─────────────┐   ┌───────────────┐
//! │ DhcpFetcher │ → │  transform  │ → │ ZonePublisher │
//! │   (GET)     │   │   (pure)    │   │ (PUT → POST)  │
//! └─────────────┘   └─────────────┘   └───────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. Fetch leases; a fetch failure aborts before anything is written
//! 2. Transform; an unsupported address type aborts before anything is written
//! 3. Optionally log the full record set
//! 4. Publish; the zone only changes if the PUT or the POST is accepted
//! 5. Log the confirmation line and return a [`SyncReport`]
//!
//! Stages run strictly one after another. Nothing is retried here; a failed
//! run is retried, if at all, by whatever scheduled it.

use crate::config::SyncConfig;
use crate::error::Result;
use crate::fetcher::DhcpFetcher;
use crate::publisher::{PublishOutcome, ZonePublisher};
use crate::traits::ApplianceTransport;
use crate::transform::transform;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Capacity of the pipeline event channel
///
/// A run emits at most four events.
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Events emitted by the SyncPipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Run started
    Started { host: String, zone: String },

    /// DHCP leases read and filtered
    RecordsFetched { count: usize },

    /// Record set built and ready to upload
    RecordSetBuilt { entries: usize },

    /// Record set accepted by the appliance
    Published {
        zone: String,
        outcome: PublishOutcome,
    },

    /// Run aborted
    Failed { error: String },
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Leases with a hostname returned by the DHCP monitor
    pub fetched: usize,
    /// Entries uploaded to the zone
    pub published: usize,
    /// Which attempt the appliance accepted
    pub outcome: PublishOutcome,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the upload was accepted
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Wall-clock duration of the run
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }
}

/// One-shot DHCP → DNS sync
///
/// ## Lifecycle
///
/// 1. Create with [`SyncPipeline::new()`]
/// 2. Call [`SyncPipeline::run()`] once per scheduled trigger
/// 3. Drop
///
/// The pipeline holds no state between runs; calling `run()` again performs
/// a fresh, full-replace sync.
pub struct SyncPipeline {
    /// Transport to the appliance
    transport: Box<dyn ApplianceTransport>,

    /// Stage 1
    fetcher: DhcpFetcher,

    /// Stage 3
    publisher: ZonePublisher,

    /// TTL written on every entry
    ttl: u32,

    /// Log the full record set before uploading
    log_records: bool,

    /// Appliance host, for log lines
    host: String,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<PipelineEvent>,
}

impl SyncPipeline {
    /// Create a new sync pipeline
    ///
    /// # Parameters
    ///
    /// - `transport`: transport to the appliance
    /// - `config`: sync configuration
    ///
    /// # Returns
    ///
    /// A tuple of (pipeline, event_receiver) where event_receiver yields pipeline events
    ///
    /// # Errors
    ///
    /// [`crate::Error::Config`] if the configuration does not validate.
    pub fn new(
        transport: Box<dyn ApplianceTransport>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<PipelineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let pipeline = Self {
            transport,
            fetcher: DhcpFetcher::new(config.ipv6, config.appliance.vdom.clone()),
            publisher: ZonePublisher::new(config.zone, config.appliance.vdom),
            ttl: config.ttl,
            log_records: config.log_records,
            host: config.appliance.host,
            event_tx: tx,
        };

        Ok((pipeline, rx))
    }

    /// Run one sync
    ///
    /// # Returns
    ///
    /// - `Ok(SyncReport)`: the zone now holds the current lease-derived record set
    /// - `Err(Error)`: the run aborted and the zone was not written
    pub async fn run(&self) -> Result<SyncReport> {
        let result = self.run_stages().await;

        if let Err(ref e) = result {
            self.emit_event(PipelineEvent::Failed {
                error: e.to_string(),
            });
        }

        result
    }

    async fn run_stages(&self) -> Result<SyncReport> {
        let started_at = Utc::now();
        let zone = self.publisher.zone().to_string();

        info!(
            "Starting DHCP to DNS sync for {} zone '{}' (vdom: {})",
            self.host,
            zone,
            self.publisher.vdom()
        );
        self.emit_event(PipelineEvent::Started {
            host: self.host.clone(),
            zone: zone.clone(),
        });

        // Stage 1: fetch
        let records = self.fetcher.fetch(self.transport.as_ref()).await?;
        let fetched = records.len();
        self.emit_event(PipelineEvent::RecordsFetched { count: fetched });

        // Stage 2: transform
        let record_set = transform(records, self.ttl)?;
        debug!("Built record set with {} entr(y/ies)", record_set.len());
        self.emit_event(PipelineEvent::RecordSetBuilt {
            entries: record_set.len(),
        });

        if self.log_records {
            let rendered = serde_json::to_string(&record_set)
                .unwrap_or_else(|e| format!("<unrenderable record set: {}>", e));
            info!(
                "Syncing the following DNS database to {} DNS server zone '{}': {}",
                self.host, zone, rendered
            );
        }

        // Stage 3: publish
        let outcome = self
            .publisher
            .publish(self.transport.as_ref(), &record_set)
            .await?;

        self.emit_event(PipelineEvent::Published {
            zone: zone.clone(),
            outcome,
        });

        info!(
            "Finished syncing DNS records of DHCP clients to {} DNS server at zone '{}'",
            self.host, zone
        );

        Ok(SyncReport {
            fetched,
            published: record_set.len(),
            outcome,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Emit a pipeline event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: PipelineEvent) {
        // A dropped receiver just means nobody is listening
        if let Err(TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Pipeline event channel full, dropping event");
        }
    }
}
