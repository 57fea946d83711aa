//! # Connections Service
//!
//! Live views over the router (who talks to what) and the two address-list toggles.

use std::collections::HashMap;
use std::sync::Arc;

use flowtally_common::config::Config;
use flowtally_common::network::address_list::ToggleItem;
use flowtally_common::network::connection::{Connection, DnsConnection, GroupedConnections};
use tracing::{debug, info, warn};

use super::{READ_TIMEOUT, WRITE_TIMEOUT, bounded};
use crate::correlate::{fetch_and_correlate, host_index};
use crate::device::RouterDevice;
use crate::error::{DeviceError, ServiceError};
use crate::toggle::{AddressListSnapshot, Mutation, reconcile};

/// Application Service for live connection data and the ignore lists.
///
/// `ignore_vpn_list` holds domains exempted from the VPN, `ignore_lan_to_vpn_list` holds
/// LAN hosts whose traffic bypasses it.
#[derive(Clone)]
pub struct ConnectionsService {
    device: Arc<dyn RouterDevice>,
    ignore_vpn_list: String,
    ignore_lan_to_vpn_list: String,
}

impl ConnectionsService {
    pub fn new(
        device: Arc<dyn RouterDevice>,
        ignore_vpn_list: impl Into<String>,
        ignore_lan_to_vpn_list: impl Into<String>,
    ) -> Self {
        Self {
            device,
            ignore_vpn_list: ignore_vpn_list.into(),
            ignore_lan_to_vpn_list: ignore_lan_to_vpn_list.into(),
        }
    }

    pub fn from_config(device: Arc<dyn RouterDevice>, cfg: &Config) -> Self {
        Self::new(device, &cfg.ignore_vpn_list, &cfg.ignore_lan_to_vpn_list)
    }

    /// Correlated connections as the router sees them right now.
    pub async fn get_connections(&self) -> Result<Vec<Connection>, ServiceError> {
        bounded("fetching connections", READ_TIMEOUT, fetch_and_correlate(self.device.as_ref())).await
    }

    /// Connections of `src_ip`, grouped by destination name in first-seen order.
    pub async fn get_by_source(&self, src_ip: &str) -> Result<Vec<GroupedConnections>, ServiceError> {
        let src_ip = src_ip.trim();
        let connections = self.get_connections().await?;

        let mut groups: Vec<GroupedConnections> = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for conn in connections.into_iter().filter(|c| c.src_ip == src_ip) {
            let slot = *slots.entry(conn.dst_dns.clone()).or_insert_with(|| {
                groups.push(GroupedConnections {
                    dst_dns: conn.dst_dns.clone(),
                    items: Vec::new(),
                    is_ignore_vpn: false,
                });
                groups.len() - 1
            });
            groups[slot].items.push(DnsConnection {
                dst_ip: conn.dst_ip,
                dst_dns: conn.dst_dns,
                is_ignore_vpn: false,
            });
        }

        if groups.is_empty() {
            return Ok(groups);
        }

        let ignored = self.ignore_vpn_snapshot().await;
        for group in &mut groups {
            group.is_ignore_vpn = ignored.is_active(&group.dst_dns);
            for item in &mut group.items {
                item.is_ignore_vpn = group.is_ignore_vpn;
            }
        }
        Ok(groups)
    }

    /// Whether every domain of `domains` (comma separated) is exempted from the VPN.
    pub async fn is_ignore_vpn(&self, domains: &str) -> Result<bool, ServiceError> {
        if domains.trim().is_empty() {
            return Ok(false);
        }
        let snapshot = bounded("reading ignore list", READ_TIMEOUT, self.snapshot(&self.ignore_vpn_list)).await?;
        Ok(snapshot.is_active(domains))
    }

    /// Adds, enables or disables every domain of `domains` in the "ignore VPN" list.
    ///
    /// Mutations are issued in input order; the first rejected one aborts the rest.
    pub async fn set_domain_ignore_state(&self, domains: &str, enabled: bool) -> Result<(), ServiceError> {
        let work = async {
            let snapshot = self.snapshot(&self.ignore_vpn_list).await?;
            self.apply(reconcile(&snapshot, domains, enabled)).await
        };
        bounded("updating ignore list", WRITE_TIMEOUT, work).await
    }

    /// Entries of the "ignore LAN to VPN" list with host names resolved from leases.
    pub async fn get_toggle_list(&self, filter: &str) -> Result<Vec<ToggleItem>, ServiceError> {
        let work = async {
            let snapshot = self.snapshot(&self.ignore_lan_to_vpn_list).await?;
            let leases = self.device.dhcp_leases().await?;
            Ok::<_, DeviceError>(snapshot.toggle_items(&host_index(&leases), filter))
        };
        bounded("reading toggle list", WRITE_TIMEOUT, work).await
    }

    /// Switches one host in the "ignore LAN to VPN" list. A blank address does nothing.
    pub async fn set_toggle_state(&self, ip: &str, enabled: bool) -> Result<(), ServiceError> {
        let ip = ip.trim();
        if ip.is_empty() {
            debug!("ignoring toggle request without an address");
            return Ok(());
        }
        let work = async {
            let snapshot = self.snapshot(&self.ignore_lan_to_vpn_list).await?;
            self.apply(snapshot.plan(ip, enabled).into_iter().collect()).await
        };
        bounded("updating toggle list", WRITE_TIMEOUT, work).await
    }

    /// Snapshot of the "ignore VPN" list for flagging query results.
    ///
    /// The flags are decoration: when the list cannot be read every domain is reported
    /// as not ignored.
    pub(crate) async fn ignore_vpn_snapshot(&self) -> AddressListSnapshot {
        let read = bounded("reading ignore list", READ_TIMEOUT, self.snapshot(&self.ignore_vpn_list)).await;
        read.unwrap_or_else(|err| {
            warn!(list = %self.ignore_vpn_list, error = %err, "ignore list unavailable");
            AddressListSnapshot::new(&self.ignore_vpn_list, Vec::new())
        })
    }

    async fn snapshot(&self, list: &str) -> Result<AddressListSnapshot, DeviceError> {
        let entries = self.device.address_list(list).await?;
        Ok(AddressListSnapshot::new(list, entries))
    }

    async fn apply(&self, mutations: Vec<Mutation>) -> Result<(), DeviceError> {
        if mutations.is_empty() {
            debug!("address list already in the requested state");
        }
        for mutation in mutations {
            match &mutation {
                Mutation::Add { list, address } => self.device.add_list_entry(list, address).await?,
                Mutation::SetDisabled { id, disabled, .. } => {
                    self.device.set_entry_disabled(id, *disabled).await?
                }
            }
            info!(%mutation, "address list updated");
        }
        Ok(())
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
