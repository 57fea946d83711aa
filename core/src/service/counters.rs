//! # Counter Query Service
//!
//! Reads back what the collector stored and decorates it with the live ignore flags.

use std::collections::HashMap;
use std::sync::Arc;

use flowtally_common::network::counter::{DestinationItem, DomainSummary};

use super::{READ_TIMEOUT, bounded};
use super::connections::ConnectionsService;
use crate::error::ServiceError;
use crate::store::CounterStore;

#[derive(Clone)]
pub struct CounterQueryService {
    store: Arc<dyn CounterStore>,
    connections: ConnectionsService,
}

impl CounterQueryService {
    pub fn new(store: Arc<dyn CounterStore>, connections: ConnectionsService) -> Self {
        Self { store, connections }
    }

    /// Domains matching `filter` (case-insensitive substring), busiest first.
    ///
    /// Counts and stamps come from the per-domain counters; every domain lists the
    /// addresses recorded for it in the per-destination counters.
    pub async fn get_domain_counters(&self, filter: &str) -> Result<Vec<DomainSummary>, ServiceError> {
        let needle = filter.trim();
        let domains = bounded("reading domain counters", READ_TIMEOUT, self.store.find_domain_counters_like(needle)).await?;
        if domains.is_empty() {
            return Ok(Vec::new());
        }
        let destinations = bounded(
            "reading destination counters",
            READ_TIMEOUT,
            self.store.find_destination_counters_like(needle),
        )
        .await?;

        let mut by_domain: HashMap<String, Vec<DestinationItem>> = HashMap::new();
        for counter in destinations {
            by_domain
                .entry(counter.dst_dns.clone())
                .or_default()
                .push(DestinationItem {
                    dst_ip: counter.dst_ip,
                    dst_dns: counter.dst_dns,
                });
        }

        let ignored = self.connections.ignore_vpn_snapshot().await;
        Ok(domains
            .into_iter()
            .map(|counter| DomainSummary {
                destinations: by_domain.remove(&counter.dst_dns).unwrap_or_default(),
                is_ignore_vpn: ignored.is_active(&counter.dst_dns),
                dst_dns: counter.dst_dns,
                active_connections: counter.active_connections,
                updated_at: counter.updated_at,
            })
            .collect())
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
