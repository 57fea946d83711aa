use serde::Serialize;

/// One flow observed on the device, enriched with the names resolved for its endpoints.
///
/// `src_ip` and `dst_ip` are never empty and never carry a port suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    #[serde(rename = "srcIP")]
    pub src_ip: String,
    #[serde(rename = "dstIP")]
    pub dst_ip: String,
    /// Name the device's DNS cache holds for `dst_ip`, empty when unknown.
    #[serde(rename = "dstDNS")]
    pub dst_dns: String,
    /// Lease host name for `src_ip`, empty when unknown.
    #[serde(rename = "hostName")]
    pub host_name: String,
}

/// A destination reached by a source, as listed in [`GroupedConnections::items`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsConnection {
    #[serde(rename = "dstIP")]
    pub dst_ip: String,
    #[serde(rename = "dstDNS")]
    pub dst_dns: String,
    #[serde(rename = "isIgnoreVpn")]
    pub is_ignore_vpn: bool,
}

/// Connections of a single source grouped by the resolved destination name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedConnections {
    #[serde(rename = "dstDns")]
    pub dst_dns: String,
    pub items: Vec<DnsConnection>,
    #[serde(rename = "isIgnoreVpn")]
    pub is_ignore_vpn: bool,
}
