//! # Counter Models
//!
//! A collection cycle folds its connections into two batches of counts. Once written,
//! every count carries the time of the upsert that last overwrote it.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Connections seen towards one domain during a single cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DomainCount {
    pub dst_dns: String,
    pub active_connections: i64,
}

/// Connections seen towards one `(ip, domain)` pair during a single cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DestinationCount {
    pub dst_ip: String,
    pub dst_dns: String,
    pub active_connections: i64,
}

/// Persisted [`DomainCount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCounter {
    pub dst_dns: String,
    pub active_connections: i64,
    pub updated_at: DateTime<Utc>,
}

/// Persisted [`DestinationCount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationCounter {
    pub dst_ip: String,
    pub dst_dns: String,
    pub active_connections: i64,
    pub updated_at: DateTime<Utc>,
}

/// One destination address listed under a [`DomainSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationItem {
    #[serde(rename = "dstIP")]
    pub dst_ip: String,
    #[serde(rename = "dstDNS")]
    pub dst_dns: String,
}

/// Query view of a domain: its latest count, the addresses it resolved to and
/// whether the domain is currently exempted from the VPN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    #[serde(rename = "dstDns")]
    pub dst_dns: String,
    #[serde(rename = "activeConnections")]
    pub active_connections: i64,
    #[serde(rename = "dnsConnections")]
    pub destinations: Vec<DestinationItem>,
    #[serde(rename = "isIgnoreVpn")]
    pub is_ignore_vpn: bool,
    #[serde(rename = "updatedAt", serialize_with = "serialize_millis")]
    pub updated_at: DateTime<Utc>,
}

/// Formats a stamp the way the store writes it: RFC 3339, UTC, milliseconds.
pub fn format_millis(stamp: &DateTime<Utc>) -> String {
    stamp.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn serialize_millis<S>(stamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_millis(stamp))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
