//! # Router Device Port
//!
//! Everything the pipeline needs from a router, expressed over raw rows so adapters stay
//! thin. The typed helpers run the rows through the normalizer in
//! [`flowtally_common::rows`].

use async_trait::async_trait;
use flowtally_common::network::address_list::AddressListEntry;
use flowtally_common::rows::{self, ConnectionRecord, DnsCacheRecord, LeaseRecord, Row};

use crate::error::DeviceError;

#[cfg(test)]
pub(crate) mod fake;

pub const DNS_CACHE: &str = "/ip/dns/cache/print";
pub const DHCP_LEASES: &str = "/ip/dhcp-server/lease/print";
pub const FIREWALL_CONNECTIONS: &str = "/ip/firewall/connection/print";
pub const ADDRESS_LIST_PRINT: &str = "/ip/firewall/address-list/print";
pub const ADDRESS_LIST_ADD: &str = "/ip/firewall/address-list/add";
pub const ADDRESS_LIST_SET: &str = "/ip/firewall/address-list/set";

#[async_trait]
pub trait RouterDevice: Send + Sync {
    /// Runs a print command, optionally narrowed by `key=value` query filters.
    async fn fetch_rows(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<Row>, DeviceError>;

    /// Creates an enabled entry for `address` in `list`.
    async fn add_list_entry(&self, list: &str, address: &str) -> Result<(), DeviceError>;

    /// Flips the `disabled` flag of an existing entry.
    async fn set_entry_disabled(&self, id: &str, disabled: bool) -> Result<(), DeviceError>;

    async fn dns_cache(&self) -> Result<Vec<DnsCacheRecord>, DeviceError> {
        Ok(rows::normalize(&self.fetch_rows(DNS_CACHE, &[]).await?))
    }

    async fn dhcp_leases(&self) -> Result<Vec<LeaseRecord>, DeviceError> {
        Ok(rows::normalize(&self.fetch_rows(DHCP_LEASES, &[]).await?))
    }

    async fn firewall_connections(&self) -> Result<Vec<ConnectionRecord>, DeviceError> {
        Ok(rows::normalize(&self.fetch_rows(FIREWALL_CONNECTIONS, &[]).await?))
    }

    async fn address_list(&self, list: &str) -> Result<Vec<AddressListEntry>, DeviceError> {
        Ok(rows::normalize(&self.fetch_rows(ADDRESS_LIST_PRINT, &[("list", list)]).await?))
    }
}
