//! # Row-Set Normalizer
//!
//! The device answers every print command with rows of string fields, and the field
//! names differ between endpoints, firmware versions and configurations. Each endpoint
//! gets one typed record here so that nothing past this module needs to know which
//! alias a given router happened to use.

use std::collections::HashMap;

use crate::network::address_list::AddressListEntry;

/// A single row returned by the device: field name to raw value.
pub type Row = HashMap<String, String>;

/// Conversion from a raw device row into a typed record.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Self;
}

/// Converts a whole row-set.
pub fn normalize<T: FromRow>(rows: &[Row]) -> Vec<T> {
    rows.iter().map(T::from_row).collect()
}

/// Returns the value of the first field in `aliases` that is present and non-empty.
pub fn first_non_empty<'a>(row: &'a Row, aliases: &[&str]) -> &'a str {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(String::as_str)
        .find(|value| !value.is_empty())
        .unwrap_or("")
}

/// Reads a RouterOS boolean. Both `true` and `yes` count as set.
pub fn flag(row: &Row, field: &str) -> bool {
    row.get(field)
        .map(|value| {
            let value = value.trim();
            value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
        })
        .unwrap_or(false)
}

/// `/ip/dns/cache/print`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnsCacheRecord {
    pub ip: String,
    pub name: String,
}

impl FromRow for DnsCacheRecord {
    fn from_row(row: &Row) -> Self {
        Self {
            ip: first_non_empty(row, &["data", "address"]).to_string(),
            name: first_non_empty(row, &["name", "dns-name"]).to_string(),
        }
    }
}

/// `/ip/dhcp-server/lease/print`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaseRecord {
    pub ip: String,
    pub host: String,
}

impl FromRow for LeaseRecord {
    fn from_row(row: &Row) -> Self {
        Self {
            ip: first_non_empty(row, &["active-address", "address"]).to_string(),
            host: first_non_empty(row, &["active-host-name", "host-name", "comment"]).to_string(),
        }
    }
}

/// `/ip/firewall/connection/print`
///
/// Addresses are kept verbatim, port suffix included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionRecord {
    pub src: String,
    pub dst: String,
}

impl FromRow for ConnectionRecord {
    fn from_row(row: &Row) -> Self {
        Self {
            src: first_non_empty(row, &["src-address"]).to_string(),
            dst: first_non_empty(row, &["dst-address"]).to_string(),
        }
    }
}

/// `/ip/firewall/address-list/print`
impl FromRow for AddressListEntry {
    fn from_row(row: &Row) -> Self {
        Self {
            id: first_non_empty(row, &[".id"]).to_string(),
            address: first_non_empty(row, &["address"]).to_string(),
            comment: first_non_empty(row, &["comment"]).trim().to_string(),
            disabled: flag(row, "disabled"),
            dynamic: flag(row, "dynamic"),
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
