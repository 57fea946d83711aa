use serde::Serialize;

/// An entry of a named address list on the device.
///
/// `dynamic` entries are managed by the device itself and are never switched on or off
/// as if they were policy entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddressListEntry {
    /// Device assigned id (`.id`), empty until the entry exists.
    pub id: String,
    pub address: String,
    pub comment: String,
    pub disabled: bool,
    pub dynamic: bool,
}

impl AddressListEntry {
    /// The address with surrounding whitespace removed, as used for matching.
    pub fn key(&self) -> &str {
        self.address.trim()
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Row of the "ignore LAN to VPN" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleItem {
    pub ip: String,
    #[serde(rename = "hostName")]
    pub host_name: String,
    pub enabled: bool,
    pub dynamic: bool,
}
