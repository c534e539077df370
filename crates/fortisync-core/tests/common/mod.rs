//! Test doubles and common utilities for pipeline contract tests

#![allow(dead_code)]

use fortisync_core::config::{ApplianceConfig, SyncConfig};
use fortisync_core::traits::{ApiRequest, ApiResponse, ApplianceTransport, TransportError};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A transport that replays canned responses and records every request
///
/// Clones share the script and the request log, so a test can hand one clone
/// to the pipeline and inspect the other afterwards.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Result<ApiResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn fail(self, msg: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(msg)));
        self
    }

    /// Every request sent so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// `"METHOD /path"` for every request sent so far
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ApplianceTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response left")))
    }

    fn target(&self) -> &str {
        "scripted"
    }
}

/// Captures formatted `tracing` output for assertions
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Install as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines containing `needle`
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// A valid configuration for the `dhcp.internal` zone on `fw.example.lan`
pub fn minimal_config() -> SyncConfig {
    SyncConfig::new(
        ApplianceConfig::new("fw.example.lan", "test-api-key"),
        "dhcp.internal",
    )
}

/// A DHCP monitor body with one hostname-less lease and three named ones
pub fn monitor_body() -> String {
    serde_json::json!({
        "http_method": "GET",
        "results": [
            {"ip": "10.0.0.5", "hostname": "printer", "interface": "lan1", "type": "ipv4",
             "mac": "00:00:00:00:00:05", "expire_time": 1760000000},
            {"ip": "10.0.0.77", "interface": "lan1", "type": "ipv4",
             "mac": "00:00:00:00:00:77"},
            {"ip": "fd00::2", "hostname": "alice", "interface": "lan1", "type": "ipv6"},
            {"ip": "10.0.0.2", "hostname": "alice", "interface": "lan1", "type": "ipv4"}
        ],
        "vdom": "root",
        "status": "success"
    })
    .to_string()
}

/// The record set [`monitor_body`] must produce with TTL 0
pub fn expected_record_set() -> serde_json::Value {
    serde_json::json!({
        "dns-entry": [
            {"id": 1, "status": "enable", "ttl": 0, "preference": 10,
             "hostname": "alice.lan1", "ip": "10.0.0.2", "type": "A"},
            {"id": 2, "status": "enable", "ttl": 0, "preference": 10,
             "hostname": "alice.lan1", "ip": "fd00::2", "type": "AAAA"},
            {"id": 3, "status": "enable", "ttl": 0, "preference": 10,
             "hostname": "printer.lan1", "ip": "10.0.0.5", "type": "A"}
        ]
    })
}
