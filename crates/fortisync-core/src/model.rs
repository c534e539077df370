//! Data model shared by the pipeline stages
//!
//! - [`DhcpClientRecord`]: a lease as reported by the DHCP monitor, projected to four fields
//! - [`DnsEntry`]: one row of the appliance's DNS zone database
//! - [`DnsRecordSet`]: the complete body uploaded to the zone resource

use serde::{Deserialize, Serialize};
use std::fmt;

/// Preference value written on every entry
///
/// The appliance carries an MX-style preference on all entries and ignores it
/// for A and AAAA records.
pub const ENTRY_PREFERENCE: u32 = 10;

/// Address family reported for a DHCP lease
///
/// Values outside `ipv4`/`ipv6` are kept verbatim in [`AddressType::Other`]
/// so the transformer can reject them by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AddressType {
    /// `"ipv4"`
    Ipv4,
    /// `"ipv6"`
    Ipv6,
    /// Any other value the appliance returned
    Other(String),
}

impl AddressType {
    /// The wire representation, also used as the sort key component
    pub fn as_str(&self) -> &str {
        match self {
            AddressType::Ipv4 => "ipv4",
            AddressType::Ipv6 => "ipv6",
            AddressType::Other(value) => value,
        }
    }
}

impl From<String> for AddressType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ipv4" => AddressType::Ipv4,
            "ipv6" => AddressType::Ipv6,
            _ => AddressType::Other(value),
        }
    }
}

impl From<&str> for AddressType {
    fn from(value: &str) -> Self {
        AddressType::from(value.to_string())
    }
}

impl From<AddressType> for String {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DHCP lease that carried a hostname
///
/// Any other fields the monitor returns are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpClientRecord {
    /// Leased address, as reported
    pub ip: String,
    /// Client-supplied hostname
    pub hostname: String,
    /// Appliance interface the lease was handed out on
    pub interface: String,
    /// Address family of the lease
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

impl DhcpClientRecord {
    /// Create a new record
    pub fn new(
        ip: impl Into<String>,
        hostname: impl Into<String>,
        interface: impl Into<String>,
        address_type: impl Into<AddressType>,
    ) -> Self {
        Self {
            ip: ip.into(),
            hostname: hostname.into(),
            interface: interface.into(),
            address_type: address_type.into(),
        }
    }

    /// Ordering key: `(interface, hostname, type, ip)`, all compared as strings
    pub fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.interface,
            &self.hostname,
            self.address_type.as_str(),
            &self.ip,
        )
    }

    /// Zone hostname for this lease: `<hostname>.<interface>`
    pub fn zone_hostname(&self) -> String {
        format!("{}.{}", self.hostname, self.interface)
    }
}

/// DNS record type written to the zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnsRecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl DnsRecordType {
    /// Record type name as the appliance spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsRecordType::A => "A",
            DnsRecordType::Aaaa => "AAAA",
        }
    }
}

impl TryFrom<&AddressType> for DnsRecordType {
    type Error = crate::Error;

    fn try_from(address_type: &AddressType) -> Result<Self, Self::Error> {
        match address_type {
            AddressType::Ipv4 => Ok(DnsRecordType::A),
            AddressType::Ipv6 => Ok(DnsRecordType::Aaaa),
            AddressType::Other(value) => Err(crate::Error::unsupported_address_type(value)),
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry status; the sync only ever writes enabled entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Enable,
}

/// One entry of the zone's `dns-entry` table
///
/// Field order matches what the appliance's configuration API returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsEntry {
    /// 1-based position in the sorted record set; reassigned every run
    pub id: u32,
    pub status: EntryStatus,
    pub ttl: u32,
    pub preference: u32,
    /// `<dhcp hostname>.<dhcp interface>`
    pub hostname: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
}

/// The full record set uploaded to a zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordSet {
    #[serde(rename = "dns-entry")]
    pub entries: Vec<DnsEntry>,
}

impl DnsRecordSet {
    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in upload order
    pub fn iter(&self) -> impl Iterator<Item = &DnsEntry> {
        self.entries.iter()
    }
}
