//! # Aggregation Folder
//!
//! Pure, single-pass reduction of one cycle's connections into two count batches.
//! Batches come out sorted by key so identical inputs in any order fold to identical
//! output.

use std::collections::BTreeMap;

use flowtally_common::network::connection::Connection;
use flowtally_common::network::counter::{DestinationCount, DomainCount};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterBatch {
    pub domains: Vec<DomainCount>,
    pub destinations: Vec<DestinationCount>,
}

impl CounterBatch {
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.destinations.is_empty()
    }
}

/// Counts connections per domain and per `(ip, domain)` pair.
///
/// Connections without a resolved name or without a destination (after trimming) are
/// not counted.
pub fn fold(connections: &[Connection]) -> CounterBatch {
    let mut by_domain: BTreeMap<&str, i64> = BTreeMap::new();
    let mut by_destination: BTreeMap<(&str, &str), i64> = BTreeMap::new();

    for conn in connections {
        let dns = conn.dst_dns.trim();
        let ip = conn.dst_ip.trim();
        if dns.is_empty() || ip.is_empty() {
            continue;
        }
        *by_domain.entry(dns).or_default() += 1;
        *by_destination.entry((ip, dns)).or_default() += 1;
    }

    CounterBatch {
        domains: by_domain
            .into_iter()
            .map(|(dns, count)| DomainCount {
                dst_dns: dns.to_string(),
                active_connections: count,
            })
            .collect(),
        destinations: by_destination
            .into_iter()
            .map(|((ip, dns), count)| DestinationCount {
                dst_ip: ip.to_string(),
                dst_dns: dns.to_string(),
                active_connections: count,
            })
            .collect(),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
