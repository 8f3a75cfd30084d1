//! Lease extender background task
//!
//! Refreshes the TTL on a held lock so the lease outlives its nominal
//! duration for as long as the owner is alive. One extender runs per
//! acquisition, bound to that acquisition's owner token.

use crate::clock::{Clock, Ticker};
use crate::connection;
use crate::constants::LEASE_TICKS_PER_DURATION;
use crate::mutex::scripts;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Spawn the extender for a freshly acquired lock.
///
/// The task is deliberately detached from the acquiring caller: a cancelled
/// request must not drop a lease its owner still believes it holds. The task
/// terminates on its own when the extend script reports the token no longer
/// owns the record (unlocked, expired, or superseded), or on a transport
/// error, after which the record's TTL bounds how long the lock stays
/// visible.
pub(crate) fn spawn(
    client: redis::Client,
    clock: Arc<dyn Clock>,
    key: String,
    lock_key: String,
    token: Uuid,
    lease_duration: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ticker = Ticker::new(clock, lease_duration / LEASE_TICKS_PER_DURATION);
        let token = token.to_string();
        let ttl_ms = lease_duration.as_millis() as u64;

        loop {
            ticker.tick().await;

            let mut conn = match connection::acquire(&client, "extend lease").await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("[MUTEX] lease extender for {} stopping: {}", key, e);
                    return;
                }
            };

            match scripts::extend(&mut conn, &lock_key, ttl_ms, &token).await {
                Ok(1) => {
                    tracing::trace!("[MUTEX] lease extended for {}", key);
                }
                Ok(_) => {
                    // Token no longer owns the record.
                    tracing::debug!("[MUTEX] lease extender for {} stopping: ownership lost", key);
                    return;
                }
                Err(e) => {
                    tracing::warn!("[MUTEX] failed to extend lease for {}: {}", key, e);
                    return;
                }
            }
        }
    })
}
