pub mod collect;
pub mod migrate;
pub mod serve;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use flowtally_common::config::{
    Config, DEFAULT_COLLECT_INTERVAL, DEFAULT_HTTP_PORT, DEFAULT_IGNORE_LAN_TO_VPN_LIST,
    DEFAULT_IGNORE_VPN_LIST,
};

/// Older deployments set the database location under this name.
const LEGACY_DSN_ENV: &str = "APP_PG_DSN";

#[derive(Parser)]
#[command(name = "flowtally")]
#[command(about = "Counts who talks to which domain through a RouterOS router.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the collector and the HTTP API until interrupted
    #[command(alias = "s")]
    Serve,
    /// Run a single collection cycle and report what was stored
    #[command(alias = "c")]
    Collect,
    /// Create or upgrade the counter database
    #[command(alias = "m")]
    Migrate,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Port of the HTTP API
    #[arg(long, env = "APP_HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT, global = true)]
    pub http_port: u16,

    /// SQLite database path or file: URI
    #[arg(long = "db", env = "APP_SQLITE_DSN", global = true)]
    pub sqlite_dsn: Option<String>,

    /// RouterOS API address, host:port
    #[arg(long, env = "APP_MIKROTIK_ADDR", default_value = "", global = true)]
    pub router_addr: String,

    #[arg(long, env = "APP_MIKROTIK_USER", default_value = "", global = true)]
    pub router_user: String,

    #[arg(long, env = "APP_MIKROTIK_PASSWORD", default_value = "", hide_env_values = true, global = true)]
    pub router_password: String,

    /// Address list holding domains that bypass the VPN
    #[arg(long, env = "APP_IGNORE_VPN_LIST", default_value = DEFAULT_IGNORE_VPN_LIST, global = true)]
    pub ignore_vpn_list: String,

    /// Address list holding LAN hosts that bypass the VPN
    #[arg(long, env = "APP_IGNORE_LAN_TO_VPN_LIST", default_value = DEFAULT_IGNORE_LAN_TO_VPN_LIST, global = true)]
    pub ignore_lan_to_vpn_list: String,

    /// Seconds between two collection cycles
    #[arg(
        long,
        env = "APP_COLLECT_SECONDS",
        default_value_t = DEFAULT_COLLECT_INTERVAL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        global = true
    )]
    pub collect_seconds: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl ConfigArgs {
    pub fn into_config(self) -> Config {
        let sqlite_dsn = self
            .sqlite_dsn
            .filter(|dsn| !dsn.trim().is_empty())
            .or_else(|| std::env::var(LEGACY_DSN_ENV).ok())
            .unwrap_or_default();

        Config {
            http_port: self.http_port,
            sqlite_dsn,
            router_addr: self.router_addr,
            router_user: self.router_user,
            router_password: self.router_password,
            ignore_vpn_list: self.ignore_vpn_list,
            ignore_lan_to_vpn_list: self.ignore_lan_to_vpn_list,
            collect_interval: Duration::from_secs(self.collect_seconds),
        }
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
