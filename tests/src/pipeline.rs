#![cfg(test)]
use std::sync::Arc;
use std::time::Duration;

use flowtally_common::network::connection::Connection;
use flowtally_core::aggregate::fold;
use flowtally_core::collector::{Collector, CycleOutcome};
use flowtally_core::device::{DHCP_LEASES, DNS_CACHE, FIREWALL_CONNECTIONS};
use flowtally_core::error::{DeviceError, ServiceError};
use flowtally_core::service::{ConnectionsService, CounterQueryService};
use flowtally_core::store::{CounterStore, SqliteCounterStore};

use crate::support::{MemoryRouter, row};

fn scenario_router() -> MemoryRouter {
    MemoryRouter::new()
        .with_rows(DNS_CACHE, vec![row(&[("data", "1.2.3.4"), ("name", "x.com")])])
        .with_rows(
            DHCP_LEASES,
            vec![row(&[("active-address", "10.0.0.5"), ("active-host-name", "laptop")])],
        )
        .with_rows(
            FIREWALL_CONNECTIONS,
            vec![row(&[("src-address", "10.0.0.5:51000"), ("dst-address", "1.2.3.4:443")])],
        )
}

struct Pipeline {
    router: Arc<MemoryRouter>,
    store: SqliteCounterStore,
    connections: ConnectionsService,
    collector: Collector,
    counters: CounterQueryService,
}

fn pipeline(router: MemoryRouter) -> Pipeline {
    let router = Arc::new(router);
    let store = SqliteCounterStore::open_in_memory().expect("in-memory store");
    let connections = ConnectionsService::new(router.clone(), "ignoreVpn", "ignoreLanToVpn");
    let collector = Collector::new(connections.clone(), Arc::new(store.clone()), Duration::from_secs(10));
    let counters = CounterQueryService::new(Arc::new(store.clone()), connections.clone());
    Pipeline {
        router,
        store,
        connections,
        collector,
        counters,
    }
}

/// One DNS row, one lease and one flow become one enriched connection and one count
/// per key.
#[tokio::test]
async fn end_to_end_scenario() {
    let p = pipeline(scenario_router());

    let connections = p.connections.get_connections().await.unwrap();
    assert_eq!(
        connections,
        vec![Connection {
            src_ip: "10.0.0.5".to_string(),
            dst_ip: "1.2.3.4".to_string(),
            dst_dns: "x.com".to_string(),
            host_name: "laptop".to_string(),
        }]
    );

    let batch = fold(&connections);
    assert_eq!(batch.domains.len(), 1);
    assert_eq!(batch.domains[0].dst_dns, "x.com");
    assert_eq!(batch.domains[0].active_connections, 1);
    assert_eq!(batch.destinations.len(), 1);
    assert_eq!(batch.destinations[0].dst_ip, "1.2.3.4");
    assert_eq!(batch.destinations[0].active_connections, 1);

    assert_eq!(
        p.collector.tick().await,
        CycleOutcome::Updated { domains: 1, destinations: 1 }
    );

    let summaries = p.counters.get_domain_counters("").await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].dst_dns, "x.com");
    assert_eq!(summaries[0].active_connections, 1);
    assert_eq!(summaries[0].destinations.len(), 1);
    assert_eq!(summaries[0].destinations[0].dst_ip, "1.2.3.4");
    assert!(!summaries[0].is_ignore_vpn);
}

#[tokio::test]
async fn counts_reflect_the_latest_cycle_only() {
    let p = pipeline(scenario_router());

    for _ in 0..3 {
        p.collector.tick().await;
    }
    let domains = p.store.find_domain_counters_like("x.com").await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].active_connections, 1);
    let first_stamp = domains[0].updated_at;

    p.router.set_rows(
        FIREWALL_CONNECTIONS,
        vec![
            row(&[("src-address", "10.0.0.5:51000"), ("dst-address", "1.2.3.4:443")]),
            row(&[("src-address", "10.0.0.5:51001"), ("dst-address", "1.2.3.4:443")]),
            row(&[("src-address", "10.0.0.6:40000"), ("dst-address", "1.2.3.4:80")]),
        ],
    );
    p.collector.tick().await;

    let domains = p.store.find_domain_counters_like("x.com").await.unwrap();
    assert_eq!(domains[0].active_connections, 3);
    assert!(domains[0].updated_at >= first_stamp);

    let destinations = p.store.find_destination_counters_like("x.com").await.unwrap();
    assert_eq!(destinations.len(), 1);
    assert_eq!(destinations[0].active_connections, 3);
}

#[tokio::test]
async fn failed_cycle_leaves_previous_counts() {
    let p = pipeline(scenario_router());
    p.collector.tick().await;

    p.router.fail_on(FIREWALL_CONNECTIONS);
    p.router.set_rows(FIREWALL_CONNECTIONS, Vec::new());
    let outcome = p.collector.tick().await;
    assert!(matches!(outcome, CycleOutcome::Skipped { .. }));

    let domains = p.store.find_domain_counters_like("").await.unwrap();
    assert_eq!(domains.len(), 1);
    assert_eq!(domains[0].active_connections, 1);

    p.router.heal();
    assert_eq!(
        p.collector.tick().await,
        CycleOutcome::Updated { domains: 0, destinations: 0 }
    );
}

#[tokio::test]
async fn unresolved_destinations_are_not_counted() {
    let router = scenario_router().with_rows(
        FIREWALL_CONNECTIONS,
        vec![
            row(&[("src-address", "10.0.0.5:51000"), ("dst-address", "1.2.3.4:443")]),
            row(&[("src-address", "10.0.0.5:51001"), ("dst-address", "8.8.8.8:53")]),
            row(&[("src-address", ""), ("dst-address", "1.2.3.4:443")]),
            row(&[("src-address", "fe80::1"), ("dst-address", "2001:db8::1")]),
        ],
    );
    let p = pipeline(router);

    let connections = p.connections.get_connections().await.unwrap();
    assert_eq!(connections.len(), 3);
    assert!(connections.iter().all(|c| !c.src_ip.is_empty() && !c.dst_ip.is_empty()));
    assert_eq!(connections[2].dst_ip, "2001:db8::1");

    assert_eq!(
        p.collector.tick().await,
        CycleOutcome::Updated { domains: 1, destinations: 1 }
    );
}

#[tokio::test(start_paused = true)]
async fn slow_router_times_out() {
    let p = pipeline(scenario_router());
    p.router.set_latency(Duration::from_secs(30));

    let err = p.connections.get_connections().await.unwrap_err();
    assert!(matches!(err, ServiceError::Timeout { .. }));

    let outcome = p.collector.tick().await;
    assert!(matches!(outcome, CycleOutcome::Skipped { ref reason } if reason.contains("timed out")));
}

#[tokio::test]
async fn by_source_groups_live_connections() {
    let router = scenario_router()
        .with_rows(
            DNS_CACHE,
            vec![
                row(&[("data", "1.2.3.4"), ("name", "x.com")]),
                row(&[("address", "1.2.3.9"), ("dns-name", "x.com")]),
            ],
        )
        .with_rows(
            FIREWALL_CONNECTIONS,
            vec![
                row(&[("src-address", "10.0.0.5:1"), ("dst-address", "1.2.3.4:443")]),
                row(&[("src-address", "10.0.0.5:2"), ("dst-address", "1.2.3.9:443")]),
                row(&[("src-address", "10.0.0.6:3"), ("dst-address", "1.2.3.9:443")]),
            ],
        )
        .with_list_entry("ignoreVpn", "*1", "x.com", false, false);
    let p = pipeline(router);

    let groups = p.connections.get_by_source("10.0.0.5").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].dst_dns, "x.com");
    assert_eq!(groups[0].items.len(), 2);
    assert!(groups[0].is_ignore_vpn);

    assert!(p.connections.get_by_source("10.0.0.99").await.unwrap().is_empty());
}

#[tokio::test]
async fn device_errors_surface_on_request_paths() {
    let p = pipeline(scenario_router());
    p.router.fail_on(DNS_CACHE);
    let err = p.connections.get_by_source("10.0.0.5").await.unwrap_err();
    assert!(matches!(err, ServiceError::Device(DeviceError::Trap { .. })));
}
