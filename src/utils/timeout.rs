//! Timeout defaults and async timeout wrappers.

use crate::error::{ProtocolError, Result};
use std::future::Future;
use std::time::Duration;

/// Idle period after which a silent client is dropped
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Bound on draining connections and flushing queued packets at shutdown
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Await `future`, mapping an elapsed deadline to [`ProtocolError::Timeout`].
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| ProtocolError::Timeout)
}
