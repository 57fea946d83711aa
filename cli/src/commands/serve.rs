use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use flowtally_common::config::Config;
use flowtally_core::collector::Collector;
use flowtally_core::device::RouterDevice;
use flowtally_core::network::transport::{RouterHandle, RouterSettings};
use flowtally_core::service::{ConnectionsService, CounterQueryService};
use flowtally_core::store::{CounterStore, SqliteCounterStore};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::server::{self, AppState};
use crate::terminal::print;

pub async fn serve(cfg: &Config) -> anyhow::Result<()> {
    print::header("starting flowtally");

    let store = SqliteCounterStore::open(&cfg.sqlite_dsn)
        .with_context(|| format!("cannot open counter store {:?}", cfg.sqlite_dsn))?;
    let store: Arc<dyn CounterStore> = Arc::new(store);
    let router: Arc<dyn RouterDevice> = Arc::new(RouterHandle::spawn(RouterSettings::from(cfg)));

    let connections = ConnectionsService::from_config(router, cfg);
    let counters = CounterQueryService::new(store.clone(), connections.clone());
    let collector = Collector::new(connections.clone(), store, cfg.collect_interval);

    let (stop_tx, stop_rx) = watch::channel(false);
    let collector_task = tokio::spawn(async move { collector.run(stop_rx).await });

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    print::aligned_line("http", addr);
    print::aligned_line("router", &cfg.router_addr);
    print::aligned_line("database", &cfg.sqlite_dsn);
    print::aligned_line("interval", format!("{}s", cfg.collect_interval.as_secs()));

    let app = server::router(AppState::new(connections, counters));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("shutting down");
    if stop_tx.send(true).is_err() {
        warn!("collector already stopped");
    }
    collector_task.await.context("collector task failed")?;
    print::end_of_program();
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
