//! # Connection Correlator
//!
//! Joins three independent device datasets on IP address: the DNS cache names the
//! destination, the DHCP lease names the source.

use std::collections::HashMap;

use flowtally_common::network::address::strip_port;
use flowtally_common::network::connection::Connection;
use flowtally_common::rows::{ConnectionRecord, DnsCacheRecord, LeaseRecord};
use tracing::debug;

use crate::device::RouterDevice;
use crate::error::DeviceError;

/// IP to resolved name. Rows missing either side are ignored; later rows win.
pub fn dns_index(records: &[DnsCacheRecord]) -> HashMap<String, String> {
    records
        .iter()
        .filter(|r| !r.ip.is_empty() && !r.name.is_empty())
        .map(|r| (r.ip.clone(), r.name.clone()))
        .collect()
}

/// IP to lease host name. Rows missing either side are ignored; later rows win.
pub fn host_index(records: &[LeaseRecord]) -> HashMap<String, String> {
    records
        .iter()
        .filter(|r| !r.ip.is_empty() && !r.host.is_empty())
        .map(|r| (r.ip.clone(), r.host.clone()))
        .collect()
}

/// Builds one [`Connection`] per firewall connection row, in row order.
///
/// Rows whose source or destination is empty once the port is stripped are dropped.
pub fn correlate(
    dns: &[DnsCacheRecord],
    leases: &[LeaseRecord],
    connections: &[ConnectionRecord],
) -> Vec<Connection> {
    let dns_by_ip = dns_index(dns);
    let host_by_ip = host_index(leases);

    connections
        .iter()
        .filter_map(|row| {
            let src = strip_port(row.src.trim());
            let dst = strip_port(row.dst.trim());
            if src.is_empty() || dst.is_empty() {
                return None;
            }
            Some(Connection {
                src_ip: src.to_string(),
                dst_ip: dst.to_string(),
                dst_dns: dns_by_ip.get(dst).cloned().unwrap_or_default(),
                host_name: host_by_ip.get(src).cloned().unwrap_or_default(),
            })
        })
        .collect()
}

/// Fetches the three row-sets one after another and correlates them.
///
/// The first failing fetch aborts the whole correlation.
pub async fn fetch_and_correlate(device: &dyn RouterDevice) -> Result<Vec<Connection>, DeviceError> {
    let dns = device.dns_cache().await?;
    let leases = device.dhcp_leases().await?;
    let rows = device.firewall_connections().await?;

    let connections = correlate(&dns, &leases, &rows);
    debug!(
        dns = dns.len(),
        leases = leases.len(),
        rows = rows.len(),
        connections = connections.len(),
        "correlated device state"
    );
    Ok(connections)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
