//! Record transformer
//!
//! Maps DHCP leases to the zone's `dns-entry` table. Pure: no I/O, and the
//! same input set always yields the same record set regardless of the order
//! the appliance listed the leases in.

use crate::error::Result;
use crate::model::{
    DhcpClientRecord, DnsEntry, DnsRecordSet, DnsRecordType, ENTRY_PREFERENCE, EntryStatus,
};

/// Build the zone record set from DHCP leases
///
/// Leases are sorted by `(interface, hostname, type, ip)` and numbered from 1
/// in that order. A lease whose address type has no DNS record type aborts
/// the whole transform with [`crate::Error::UnsupportedAddressType`]; nothing
/// is dropped silently.
///
/// # Parameters
///
/// - `records`: leases that carried a hostname
/// - `ttl`: TTL written on every entry
pub fn transform(mut records: Vec<DhcpClientRecord>, ttl: u32) -> Result<DnsRecordSet> {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let entries = records
        .into_iter()
        .zip(1u32..)
        .map(|(record, id)| -> Result<DnsEntry> {
            let record_type = DnsRecordType::try_from(&record.address_type)?;
            Ok(DnsEntry {
                id,
                status: EntryStatus::Enable,
                ttl,
                preference: ENTRY_PREFERENCE,
                hostname: record.zone_hostname(),
                ip: record.ip,
                record_type,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DnsRecordSet { entries })
}
