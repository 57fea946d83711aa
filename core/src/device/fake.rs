//! In-memory router used by the unit tests of this crate.
//!
//! The integration crate ships a richer `MemoryRouter` built on this crate, so it cannot
//! serve these tests. Both doubles share builder semantics: `with_rows` replaces the rows
//! of a path and `with_list_entry` appends one address-list row.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use flowtally_common::rows::Row;

use super::{ADDRESS_LIST_PRINT, RouterDevice};
use crate::error::DeviceError;

pub(crate) fn row(fields: &[(&str, &str)]) -> Row {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Row>>,
    failing: Option<String>,
    mutations: Vec<String>,
    next_id: usize,
}

#[derive(Default)]
pub(crate) struct FakeRouter {
    state: Mutex<State>,
}

impl FakeRouter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replaces every row answered for `path`.
    pub(crate) fn with_rows(self, path: &str, rows: Vec<Row>) -> Self {
        self.state.lock().unwrap().tables.insert(path.to_string(), rows);
        self
    }

    pub(crate) fn with_list_entry(self, list: &str, id: &str, address: &str, disabled: bool, dynamic: bool) -> Self {
        let entry = row(&[
            (".id", id),
            ("list", list),
            ("address", address),
            ("disabled", if disabled { "true" } else { "false" }),
            ("dynamic", if dynamic { "true" } else { "false" }),
        ]);
        self.state
            .lock()
            .unwrap()
            .tables
            .entry(ADDRESS_LIST_PRINT.to_string())
            .or_default()
            .push(entry);
        self
    }

    /// Every fetch of `path` fails from now on.
    pub(crate) fn fail_on(&self, path: &str) {
        self.state.lock().unwrap().failing = Some(path.to_string());
    }

    pub(crate) fn mutations(&self) -> Vec<String> {
        self.state.lock().unwrap().mutations.clone()
    }

    pub(crate) fn list_rows(&self, list: &str) -> Vec<Row> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(ADDRESS_LIST_PRINT)
            .into_iter()
            .flatten()
            .filter(|r| r.get("list").map(String::as_str) == Some(list))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RouterDevice for FakeRouter {
    async fn fetch_rows(&self, path: &str, filters: &[(&str, &str)]) -> Result<Vec<Row>, DeviceError> {
        let state = self.state.lock().unwrap();
        if state.failing.as_deref() == Some(path) {
            return Err(DeviceError::Trap {
                command: path.to_string(),
                message: "no such command".to_string(),
            });
        }
        Ok(state
            .tables
            .get(path)
            .into_iter()
            .flatten()
            .filter(|r| filters.iter().all(|(k, v)| r.get(*k).map(String::as_str) == Some(*v)))
            .cloned()
            .collect())
    }

    async fn add_list_entry(&self, list: &str, address: &str) -> Result<(), DeviceError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("*A{}", state.next_id);
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
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let value = if disabled { "yes" } else { "no" };
        let entry = state
            .tables
            .get_mut(ADDRESS_LIST_PRINT)
            .and_then(|rows| rows.iter_mut().find(|r| r.get(".id").map(String::as_str) == Some(id)));
        match entry {
            Some(entry) => {
                entry.insert("disabled".to_string(), value.to_string());
                state.mutations.push(format!("set {id} disabled={value}"));
                Ok(())
            }
            None => Err(DeviceError::Trap {
                command: "/ip/firewall/address-list/set".to_string(),
                message: "no such item".to_string(),
            }),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DNS_CACHE;

    #[tokio::test]
    async fn rows_replace_while_list_entries_append() {
        let router = FakeRouter::new()
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
