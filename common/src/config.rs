use std::time::Duration;

/// Runtime settings shared by the collector, the services and the HTTP front end.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP front end listens on.
    pub http_port: u16,

    /// Path (or `file:` URI) of the SQLite database holding the counters.
    pub sqlite_dsn: String,

    /// `host:port` of the RouterOS API, usually port 8728.
    pub router_addr: String,
    pub router_user: String,
    pub router_password: String,

    /// Address list toggled by the per-domain "ignore VPN" switch.
    pub ignore_vpn_list: String,
    /// Address list toggled by the per-host "ignore LAN to VPN" switch.
    pub ignore_lan_to_vpn_list: String,

    /// Fixed period between two collection cycles.
    pub collect_interval: Duration,
}

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_IGNORE_VPN_LIST: &str = "ignoreVpn";
pub const DEFAULT_IGNORE_LAN_TO_VPN_LIST: &str = "ignoreLanToVpn";
pub const DEFAULT_COLLECT_INTERVAL: Duration = Duration::from_secs(10);
