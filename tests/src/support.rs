//! # Test Support
//!
//! An in-memory router that answers the commands the pipeline issues, keeps address
//! lists mutable and records every mutation it receives.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use flowtally_common::rows::Row;
use flowtally_core::device::{ADDRESS_LIST_ADD, ADDRESS_LIST_PRINT, ADDRESS_LIST_SET, RouterDevice};
use flowtally_core::error::DeviceError;
use tracing::debug;

/// Builds a device row from `key, value` pairs.
pub fn row(fields: &[(&str, &str)]) -> Row {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    failing: Vec<String>,
    latency: Option<Duration>,
    mutations: Vec<String>,
    fetches: usize,
    next_id: usize,
}

/// Router double backed by plain row tables keyed by command path.
///
/// Mirrors the unit-test double inside `flowtally-core`: `with_rows` replaces the rows of a
/// path and `with_list_entry` appends one address-list row. On top of that it can heal,
/// add latency and count fetches.
#[derive(Default)]
pub struct MemoryRouter {
    state: Mutex<State>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces every row answered for `path`.
    pub fn set_rows(&self, path: &str, rows: Vec<Row>) {
        self.lock().tables.insert(path.to_string(), rows);
    }

    pub fn with_rows(self, path: &str, rows: Vec<Row>) -> Self {
        self.set_rows(path, rows);
        self
    }

    pub fn with_list_entry(self, list: &str, id: &str, address: &str, disabled: bool, dynamic: bool) -> Self {
        self.lock()
            .tables
            .entry(ADDRESS_LIST_PRINT.to_string())
            .or_default()
            .push(row(&[
                (".id", id),
                ("list", list),
                ("address", address),
                ("disabled", if disabled { "true" } else { "false" }),
                ("dynamic", if dynamic { "true" } else { "false" }),
            ]));
        self
    }

    /// Makes every command on `path` fail with a trap until [`MemoryRouter::heal`].
    pub fn fail_on(&self, path: &str) {
        self.lock().failing.push(path.to_string());
    }

    pub fn heal(&self) {
        self.lock().failing.clear();
    }

    /// Delays every answer, to exercise timeouts.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Mutations received so far, as `add <list> <address>` or `set <id> disabled=<yes|no>`.
    pub fn mutations(&self) -> Vec<String> {
        self.lock().mutations.clone()
    }

    /// Number of print commands answered.
    pub fn fetches(&self) -> usize {
        self.lock().fetches
    }

    /// Address-list rows of `list` as the router currently holds them.
    pub fn list_rows(&self, list: &str) -> Vec<Row> {
        self.lock()
            .tables
            .get(ADDRESS_LIST_PRINT)
            .into_iter()
            .flatten()
            .filter(|r| r.get("list").map(String::as_str) == Some(list))
            .cloned()
            .collect()
    }

    async fn gate(&self, path: &str) -> Result<(), DeviceError> {
        let (latency, failing) = {
            let state = self.lock();
            (state.latency, state.failing.iter().any(|p| p == path))
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if failing {
            return Err(DeviceError::Trap {
                command: path.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RouterDevice for MemoryRouter {
    async fn fetch_rows(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<Row>, DeviceError> {
        self.gate(path).await?;
        let mut state = self.lock();
        state.fetches += 1;
        let rows: Vec<Row> = state
            .tables
            .get(path)
            .into_iter()
            .flatten()
            .filter(|r| filters.iter().all(|(k, v)| r.get(*k).map(String::as_str) == Some(*v)))
            .cloned()
            .collect();
        debug!(path, rows = rows.len(), "memory router answered");
        Ok(rows)
    }

    async fn add_list_entry(&self, list: &str, address: &str) -> Result<(), DeviceError> {
        self.gate(ADDRESS_LIST_ADD).await?;
        let mut guard = self.lock();
        let state = &mut *guard;
        state.next_id += 1;
        let id = format!("*M{}", state.next_id);
        state.mutations.push(format!("add {list} {address}"));
        state
            .tables
            .entry(ADDRESS_LIST_PRINT.to_string())
            .or_default()
            .push(row(&[
                (".id", id.as_str()),
                ("list", list),
                ("address", address),
                ("disabled", "false"),
                ("dynamic", "false"),
            ]));
        Ok(())
    }

    async fn set_entry_disabled(&self, id: &str, disabled: bool) -> Result<(), DeviceError> {
        self.gate(ADDRESS_LIST_SET).await?;
        let mut guard = self.lock();
        let state = &mut *guard;
        let value = if disabled { "yes" } else { "no" };
        let entry = state
            .tables
            .get_mut(ADDRESS_LIST_PRINT)
            .and_then(|rows| rows.iter_mut().find(|r| r.get(".id").map(String::as_str) == Some(id)));
        let Some(entry) = entry else {
            return Err(DeviceError::Trap {
                command: ADDRESS_LIST_SET.to_string(),
                message: "no such item".to_string(),
            });
        };
        entry.insert("disabled".to_string(), value.to_string());
        state.mutations.push(format!("set {id} disabled={value}"));
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

#[cfg(test)]
mod tests {
    use super::*;
    use flowtally_core::device::DNS_CACHE;

    #[tokio::test]
    async fn rows_replace_while_list_entries_append() {
        let router = MemoryRouter::new()
            .with_rows(DNS_CACHE, vec![row(&[("data", "1.2.3.4"), ("name", "old.com")])])
            .with_rows(DNS_CACHE, vec![row(&[("data", "1.2.3.4"), ("name", "new.com")])])
            .with_list_entry("ignoreVpn", "*1", "a.com", false, false)
            .with_list_entry("ignoreVpn", "*2", "b.com", true, false);

        let dns = router.fetch_rows(DNS_CACHE, &[]).await.unwrap();
        assert_eq!(dns.len(), 1);
        assert_eq!(dns[0]["name"], "new.com");
        assert_eq!(router.list_rows("ignoreVpn").len(), 2);
    }
}
