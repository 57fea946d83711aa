//! # Flowtally Core
//!
//! The collection pipeline and the address-list toggles.
//!
//! * [`device`]: the port every router adapter implements, with typed fetch helpers.
//! * [`network`]: the RouterOS API adapter behind that port.
//! * [`correlate`]: joins DNS cache, leases and firewall connections into [`Connection`]s.
//! * [`aggregate`]: folds a cycle's connections into per-domain and per-destination counts.
//! * [`store`]: persists those counts with overwrite-on-conflict semantics.
//! * [`toggle`]: works out which address-list mutations reach a requested state.
//! * [`service`]: request-time use cases built from the pieces above.
//! * [`collector`]: the periodic, best-effort collection cycle.
//!
//! [`Connection`]: flowtally_common::network::connection::Connection

pub mod aggregate;
pub mod collector;
pub mod correlate;
pub mod device;
pub mod error;
pub mod network;
pub mod service;
pub mod store;
pub mod toggle;
