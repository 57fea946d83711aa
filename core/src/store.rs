//! # Idempotent Counter Store
//!
//! Every batch is one transaction and every row in it overwrites whatever the previous
//! cycle wrote under the same key. After any number of cycles the store holds exactly
//! the last cycle's counts, so replaying a cycle changes nothing but the timestamps.

use async_trait::async_trait;
use flowtally_common::network::counter::{
    DestinationCount, DestinationCounter, DomainCount, DomainCounter,
};

use crate::error::StoreError;

pub mod sqlite;

pub use sqlite::SqliteCounterStore;

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Upserts keyed by domain. An empty batch is a no-op.
    async fn upsert_domain_counts(&self, batch: &[DomainCount]) -> Result<(), StoreError>;

    /// Upserts keyed by `(ip, domain)`. An empty batch is a no-op.
    async fn upsert_destination_counts(&self, batch: &[DestinationCount]) -> Result<(), StoreError>;

    /// Domain counters whose name contains `needle` (case-insensitive), busiest first.
    async fn find_domain_counters_like(&self, needle: &str) -> Result<Vec<DomainCounter>, StoreError>;

    /// Destination counters whose domain contains `needle` (case-insensitive), busiest first.
    async fn find_destination_counters_like(
        &self,
        needle: &str,
    ) -> Result<Vec<DestinationCounter>, StoreError>;
}
