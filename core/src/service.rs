//! # Application Services
//!
//! Request-time use cases. Each one bounds its whole device conversation with a fixed
//! timeout so a stuck router fails the request instead of hanging it.

use std::future::Future;
use std::time::Duration;

use crate::error::ServiceError;

pub mod connections;
pub mod counters;

pub use connections::ConnectionsService;
pub use counters::CounterQueryService;

/// Bound for read-only device conversations.
pub const READ_TIMEOUT: Duration = Duration::from_secs(6);
/// Bound for conversations that read a list and then mutate it.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(8);

/// Awaits `work`, failing with [`ServiceError::Timeout`] once `after` has elapsed.
pub(crate) async fn bounded<T, E>(
    operation: &'static str,
    after: Duration,
    work: impl Future<Output = Result<T, E>>,
) -> Result<T, ServiceError>
where
    ServiceError: From<E>,
{
    match tokio::time::timeout(after, work).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ServiceError::Timeout { operation, after }),
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
