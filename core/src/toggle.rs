//! # Address-List Toggle Reconciler
//!
//! An address list on the router doubles as a set of boolean switches: an address is
//! "on" when a static, enabled entry exists for it. Given a snapshot of the list, this
//! module computes the smallest set of device mutations that reaches a requested state.
//!
//! | state             | want on           | want off           |
//! |-------------------|-------------------|--------------------|
//! | `Absent`          | add entry         | nothing            |
//! | `PresentDisabled` | set disabled=no   | nothing            |
//! | `PresentEnabled`  | nothing           | set disabled=yes   |
//! | `DeviceManaged`   | nothing           | nothing            |
//!
//! Entries are never deleted, and re-running a plan against the resulting list yields
//! no further mutations.

use std::collections::HashMap;
use std::fmt;

use flowtally_common::network::address::{contains_folded, fold_filter, split_csv};
use flowtally_common::network::address_list::{AddressListEntry, ToggleItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleState {
    Absent,
    PresentEnabled { id: String },
    PresentDisabled { id: String },
    /// Only dynamic entries match; the router owns them.
    DeviceManaged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add { list: String, address: String },
    SetDisabled { id: String, address: String, disabled: bool },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Add { list, address } => write!(f, "add {address} to {list}"),
            Mutation::SetDisabled { id, address, disabled } => {
                let verb = if *disabled { "disable" } else { "enable" };
                write!(f, "{verb} {address} ({id})")
            }
        }
    }
}

/// Entries of one named address list as read from the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressListSnapshot {
    list: String,
    entries: Vec<AddressListEntry>,
}

impl AddressListSnapshot {
    pub fn new(list: impl Into<String>, entries: Vec<AddressListEntry>) -> Self {
        Self {
            list: list.into(),
            entries,
        }
    }

    pub fn entries(&self) -> &[AddressListEntry] {
        &self.entries
    }

    /// Classifies `address` (trimmed, exact match). A static entry takes precedence over
    /// dynamic ones for the same address.
    pub fn state_of(&self, address: &str) -> ToggleState {
        let address = address.trim();
        let mut device_managed = false;

        for entry in self.entries.iter().filter(|e| e.key() == address) {
            if entry.dynamic {
                device_managed = true;
                continue;
            }
            let id = entry.id.clone();
            return if entry.disabled {
                ToggleState::PresentDisabled { id }
            } else {
                ToggleState::PresentEnabled { id }
            };
        }

        if device_managed {
            ToggleState::DeviceManaged
        } else {
            ToggleState::Absent
        }
    }

    /// The mutation moving `address` to `want_enabled`, if one is needed.
    pub fn plan(&self, address: &str, want_enabled: bool) -> Option<Mutation> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        match (self.state_of(address), want_enabled) {
            (ToggleState::Absent, true) => Some(Mutation::Add {
                list: self.list.clone(),
                address: address.to_string(),
            }),
            (ToggleState::PresentDisabled { id }, true) => Some(Mutation::SetDisabled {
                id,
                address: address.to_string(),
                disabled: false,
            }),
            (ToggleState::PresentEnabled { id }, false) => Some(Mutation::SetDisabled {
                id,
                address: address.to_string(),
                disabled: true,
            }),
            _ => None,
        }
    }

    /// Mirrors a mutation the router accepted. Added entries get `id` when the router
    /// reported one, otherwise they stay id-less until the next snapshot.
    pub fn apply(&mut self, mutation: &Mutation, id: Option<String>) {
        match mutation {
            Mutation::Add { address, .. } => self.entries.push(AddressListEntry {
                id: id.unwrap_or_default(),
                address: address.clone(),
                ..AddressListEntry::default()
            }),
            Mutation::SetDisabled { id, disabled, .. } => {
                for entry in self.entries.iter_mut().filter(|e| &e.id == id) {
                    entry.disabled = *disabled;
                }
            }
        }
    }

    /// True only when every address of `csv` has a static, enabled entry.
    /// An empty list is never active.
    pub fn is_active(&self, csv: &str) -> bool {
        let addresses = split_csv(csv);
        !addresses.is_empty()
            && addresses
                .iter()
                .all(|a| matches!(self.state_of(a), ToggleState::PresentEnabled { .. }))
    }

    /// Every entry with its resolved host name, optionally narrowed by a case-insensitive
    /// match on address or host name.
    ///
    /// Host names come from `hosts` (lease index) and fall back to the entry comment.
    pub fn toggle_items(&self, hosts: &HashMap<String, String>, filter: &str) -> Vec<ToggleItem> {
        let needle = fold_filter(filter);

        self.entries
            .iter()
            .filter(|entry| !entry.key().is_empty())
            .map(|entry| {
                let ip = entry.key().to_string();
                let host_name = hosts
                    .get(&ip)
                    .filter(|host| !host.is_empty())
                    .cloned()
                    .unwrap_or_else(|| entry.comment.clone());
                ToggleItem {
                    ip,
                    host_name,
                    enabled: entry.is_enabled(),
                    dynamic: entry.dynamic,
                }
            })
            .filter(|item| contains_folded(&item.ip, &needle) || contains_folded(&item.host_name, &needle))
            .collect()
    }
}

/// Plans every address of `csv` (trimmed, blanks dropped) in input order.
///
/// Each step is planned against the snapshot as it will look after the previous
/// steps, so repeated addresses never produce a second create.
pub fn reconcile(snapshot: &AddressListSnapshot, csv: &str, want_enabled: bool) -> Vec<Mutation> {
    let mut working = snapshot.clone();
    let mut mutations = Vec::new();

    for address in split_csv(csv) {
        if let Some(mutation) = working.plan(address, want_enabled) {
            working.apply(&mutation, None);
            mutations.push(mutation);
        }
    }
    mutations
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
