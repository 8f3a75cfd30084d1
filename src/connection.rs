//! Shared connection acquisition

use crate::constants::CONNECTION_TIMEOUT;
use crate::error::{Error, Result};
use redis::aio::MultiplexedConnection;
use tokio::time::timeout;

/// Acquire a multiplexed connection with a bounded wait.
///
/// The bound keeps callers from hanging indefinitely when the server is
/// unreachable; the failure surfaces as a transport error on `op`.
pub(crate) async fn acquire(client: &redis::Client, op: &'static str) -> Result<MultiplexedConnection> {
    match timeout(CONNECTION_TIMEOUT, client.get_multiplexed_async_connection()).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(source)) => Err(Error::transport(op, source)),
        Err(_) => Err(Error::transport(
            op,
            redis::RedisError::from((
                redis::ErrorKind::IoError,
                "timed out acquiring redis connection",
            )),
        )),
    }
}
