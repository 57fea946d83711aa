use std::sync::Arc;

use anyhow::Context;
use flowtally_common::config::Config;
use flowtally_core::collector::{Collector, CycleOutcome};
use flowtally_core::network::transport::{RouterHandle, RouterSettings};
use flowtally_core::service::ConnectionsService;
use flowtally_core::store::SqliteCounterStore;

use crate::terminal::print;

pub async fn collect(cfg: &Config) -> anyhow::Result<()> {
    print::header("running one collection cycle");

    let store = SqliteCounterStore::open(&cfg.sqlite_dsn)
        .with_context(|| format!("cannot open counter store {:?}", cfg.sqlite_dsn))?;
    let router = RouterHandle::spawn(RouterSettings::from(cfg));
    let connections = ConnectionsService::from_config(Arc::new(router), cfg);
    let collector = Collector::new(connections, Arc::new(store), cfg.collect_interval);

    match collector.tick().await {
        CycleOutcome::Updated {
            domains,
            destinations,
        } => {
            print::aligned_line("router", &cfg.router_addr);
            print::aligned_line("domains", domains);
            print::aligned_line("destinations", destinations);
            print::end_of_program();
            Ok(())
        }
        CycleOutcome::Skipped { reason } => anyhow::bail!("collection cycle skipped: {reason}"),
    }
}
