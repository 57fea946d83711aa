use std::time::Duration;

use flowtally_protocols::ProtocolError;
use thiserror::Error;

/// Failures talking to the router. None of them are retried automatically.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("router address is not configured")]
    NotConfigured,
    #[error("router i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("router protocol: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("router login failed: {0}")]
    Login(String),
    #[error("router rejected {command}: {message}")]
    Trap { command: String, message: String },
    #[error("router closed the session: {0}")]
    Fatal(String),
    #[error("router did not answer within {0:?}")]
    Timeout(Duration),
    #[error("router connection task has stopped")]
    Closed,
}

/// Failures of the counter store. A failed batch leaves nothing behind.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database path is empty")]
    EmptyDsn,
    #[error("unsupported schema version {found}, max supported {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },
    #[error("invalid timestamp {0:?} in store")]
    Timestamp(String),
    #[error("store worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },
}
