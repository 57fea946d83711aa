//! SQLite implementation of [`CounterStore`].
//!
//! One connection behind a mutex: the collector is the only writer, and request-time
//! reads simply queue behind it. All SQLite work runs on the blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flowtally_common::network::counter::{
    self, DestinationCount, DestinationCounter, DomainCount, DomainCounter,
};
use rusqlite::{Connection, params};
use tracing::debug;

use super::CounterStore;
use crate::error::StoreError;

pub const SCHEMA_VERSION: i64 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

const UPSERT_DOMAIN: &str = "
    INSERT INTO domain_conn_counts (dst_dns, active_connections, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(dst_dns) DO UPDATE SET
        active_connections = excluded.active_connections,
        updated_at = excluded.updated_at
";

const UPSERT_DESTINATION: &str = "
    INSERT INTO dst_conn_counts (dst_ip, dst_dns, active_connections, updated_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(dst_ip, dst_dns) DO UPDATE SET
        active_connections = excluded.active_connections,
        updated_at = excluded.updated_at
";

// Ties are broken by name, then address, so listings are stable between calls.
const FIND_DOMAINS: &str = "
    SELECT dst_dns, active_connections, updated_at
      FROM domain_conn_counts
     WHERE ?1 = '' OR instr(lower(dst_dns), lower(?1)) > 0
     ORDER BY active_connections DESC, dst_dns ASC
";

const FIND_DESTINATIONS: &str = "
    SELECT dst_ip, dst_dns, active_connections, updated_at
      FROM dst_conn_counts
     WHERE ?1 = '' OR instr(lower(dst_dns), lower(?1)) > 0
     ORDER BY active_connections DESC, dst_dns ASC, dst_ip ASC
";

const LATEST_STAMP: &str = "
    SELECT max(updated_at) FROM (
        SELECT updated_at FROM domain_conn_counts
        UNION ALL
        SELECT updated_at FROM dst_conn_counts
    )
";

struct Inner {
    conn: Connection,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Current UTC time at millisecond precision, never earlier than the last stamp.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let stamp = match self.last_stamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

#[derive(Clone)]
pub struct SqliteCounterStore {
    inner: Arc<Mutex<Inner>>,
}

impl SqliteCounterStore {
    /// Opens (or creates) the database at `dsn` and brings the schema up to date.
    ///
    /// `dsn` is a file path or a `file:` URI.
    pub fn open(dsn: &str) -> Result<Self, StoreError> {
        if dsn.trim().is_empty() {
            return Err(StoreError::EmptyDsn);
        }
        let conn = Connection::open(Path::new(dsn))?;
        let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&conn)?;

        let last_stamp: Option<String> = conn.query_row(LATEST_STAMP, [], |row| row.get(0))?;
        let last_stamp = last_stamp.as_deref().map(parse_stamp).transpose()?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { conn, last_stamp })),
        })
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        let inner = self.lock()?;
        schema_version(&inner.conn)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Worker("store mutex poisoned".to_string()))
    }

    async fn with_inner<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner) -> Result<T, StoreError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| StoreError::Worker("store mutex poisoned".to_string()))?;
            work(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl CounterStore for SqliteCounterStore {
    async fn upsert_domain_counts(&self, batch: &[DomainCount]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let batch = batch.to_vec();
        self.with_inner(move |inner| {
            let stamp = counter::format_millis(&inner.next_stamp());
            let tx = inner.conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_DOMAIN)?;
                for count in &batch {
                    stmt.execute(params![count.dst_dns, count.active_connections, stamp])?;
                }
            }
            tx.commit()?;
            debug!(rows = batch.len(), %stamp, "domain counters upserted");
            Ok(())
        })
        .await
    }

    async fn upsert_destination_counts(&self, batch: &[DestinationCount]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let batch = batch.to_vec();
        self.with_inner(move |inner| {
            let stamp = counter::format_millis(&inner.next_stamp());
            let tx = inner.conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(UPSERT_DESTINATION)?;
                for count in &batch {
                    stmt.execute(params![
                        count.dst_ip,
                        count.dst_dns,
                        count.active_connections,
                        stamp
                    ])?;
                }
            }
            tx.commit()?;
            debug!(rows = batch.len(), %stamp, "destination counters upserted");
            Ok(())
        })
        .await
    }

    async fn find_domain_counters_like(&self, needle: &str) -> Result<Vec<DomainCounter>, StoreError> {
        let needle = needle.to_string();
        self.with_inner(move |inner| {
            let mut stmt = inner.conn.prepare_cached(FIND_DOMAINS)?;
            let rows = stmt
                .query_map(params![needle], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(dst_dns, active_connections, updated_at)| {
                    Ok(DomainCounter {
                        dst_dns,
                        active_connections,
                        updated_at: parse_stamp(&updated_at)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn find_destination_counters_like(
        &self,
        needle: &str,
    ) -> Result<Vec<DestinationCounter>, StoreError> {
        let needle = needle.to_string();
        self.with_inner(move |inner| {
            let mut stmt = inner.conn.prepare_cached(FIND_DESTINATIONS)?;
            let rows = stmt
                .query_map(params![needle], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(dst_ip, dst_dns, active_connections, updated_at)| {
                    Ok(DestinationCounter {
                        dst_ip,
                        dst_dns,
                        active_connections,
                        updated_at: parse_stamp(&updated_at)?,
                    })
                })
                .collect()
        })
        .await
    }
}

fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let current = schema_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }

    if current < 1 {
        conn.execute_batch(include_str!("../../migrations/0001_counters.sql"))?;
        conn.execute("PRAGMA user_version = 1", []).map(|_| ())?;
        debug!("applied schema migration 1");
    }

    Ok(())
}

fn parse_stamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .map_err(|_| StoreError::Timestamp(raw.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
