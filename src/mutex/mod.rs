//! Distributed mutual-exclusion primitive
//!
//! A lease-based lock held as a Redis record with a TTL. Acquisition writes a
//! fresh owner token; a background task refreshes the TTL while the owner is
//! alive, so the lease survives arbitrarily long critical sections yet
//! expires promptly after a crash. Blocking acquisition waits on a per-lock
//! pub/sub channel with the record's TTL as a liveness fallback.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mutex = Mutex::new(client, "orders");
//! if mutex.try_lock().await? {
//!     // critical section
//!     mutex.unlock().await?;
//! }
//! ```

mod extender;
mod scripts;

use crate::clock::{Clock, SystemClock};
use crate::connection;
use crate::constants::{
    CONNECTION_TIMEOUT, DEFAULT_LEASE_DURATION, LOCK_CHANNEL_PREFIX, LOCK_KEY_PREFIX,
    UNLOCK_MESSAGE,
};
use crate::error::{Error, Result};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A distributed lock over a single logical key.
///
/// The handle holds no lock state itself; all authoritative state lives in
/// Redis. A handle may take the same lock repeatedly over its lifetime, each
/// acquisition minting its own owner token and lease extender. The lock is
/// not reentrant: a second `try_lock` while the first acquisition is held
/// fails, regardless of which handle or process issued it.
#[derive(Clone)]
pub struct Mutex {
    client: redis::Client,
    key: String,
    lease_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl Mutex {
    /// Create a lock handle for a logical key with the default 30s lease and
    /// the wall clock.
    pub fn new(client: redis::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
            lease_duration: DEFAULT_LEASE_DURATION,
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the TTL placed on the lock record. Practically speaking, this is
    /// the upper bound on how long the lock appears held after its owner
    /// abandons it.
    pub fn with_lease_duration(mut self, lease_duration: Duration) -> Self {
        self.lease_duration = lease_duration;
        self
    }

    /// Replace the time source. All waits and extender ticks go through it.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The logical key this handle locks.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The Redis key holding the lock record.
    pub fn lock_name(&self) -> String {
        format!("{}{}", LOCK_KEY_PREFIX, self.key)
    }

    /// The pub/sub channel carrying release notifications for this lock.
    pub fn channel_name(&self) -> String {
        format!("{}{}", LOCK_CHANNEL_PREFIX, self.key)
    }

    /// Attempt to acquire the lock without blocking. Returns whether the lock
    /// was acquired.
    pub async fn try_lock(&self) -> Result<bool> {
        let ttl = self.acquire_once().await?;
        Ok(ttl == 0)
    }

    /// Acquire the lock, blocking until it is free or `cancel` fires.
    ///
    /// Waiters subscribe to the release channel before retrying so a release
    /// delivered between attempts cannot be missed, and additionally wake
    /// when the holder's reported TTL elapses, which keeps waiters live even
    /// if the holder crashes without publishing.
    pub async fn lock(&self, cancel: &CancellationToken) -> Result<()> {
        if self.try_lock().await? {
            return Ok(());
        }

        let mut pubsub = match timeout(CONNECTION_TIMEOUT, self.client.get_async_pubsub()).await {
            Ok(Ok(pubsub)) => pubsub,
            Ok(Err(e)) => return Err(Error::transport("subscribe release channel", e)),
            Err(_) => {
                return Err(Error::transport(
                    "subscribe release channel",
                    redis::RedisError::from((
                        redis::ErrorKind::IoError,
                        "timed out opening pub/sub connection",
                    )),
                ))
            }
        };
        pubsub
            .subscribe(self.channel_name())
            .await
            .map_err(|e| Error::transport("subscribe release channel", e))?;

        let stream = pubsub.on_message();
        tokio::pin!(stream);
        let mut subscribed = true;

        loop {
            let ttl = self.acquire_once().await?;
            if ttl == 0 {
                return Ok(());
            }

            // A ttl of -1 means the record exists without an expiry; fall
            // back to a full lease before polling again.
            let wait = if ttl > 0 {
                Duration::from_millis(ttl as u64)
            } else {
                self.lease_duration
            };

            tokio::select! {
                _ = self.clock.sleep(wait) => {}
                msg = stream.next(), if subscribed => {
                    match msg {
                        Some(msg) => {
                            let payload: String = msg.get_payload().unwrap_or_default();
                            if payload != UNLOCK_MESSAGE {
                                tracing::trace!(
                                    "[MUTEX] ignoring message on {}: {:?}",
                                    self.key,
                                    payload
                                );
                            }
                        }
                        None => {
                            tracing::warn!(
                                "[MUTEX] release subscription for {} closed, waiting on ttl only",
                                self.key
                            );
                            subscribed = false;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    return Err(Error::canceled("waiting for lock"));
                }
            }
        }
    }

    /// Release the lock and publish a release notification.
    ///
    /// Releasing a free lock is a no-op that still returns `Ok`. The release
    /// does not compare owner tokens: a sufficiently delayed unlock from a
    /// holder whose lease already expired will release the successor's lock.
    /// The lease extender is not stopped here; it observes the deleted
    /// record on its next tick and exits.
    pub async fn unlock(&self) -> Result<()> {
        let mut conn = connection::acquire(&self.client, "release lock").await?;
        let released = scripts::release(
            &mut conn,
            &self.lock_name(),
            &self.channel_name(),
            UNLOCK_MESSAGE,
        )
        .await
        .map_err(|e| Error::transport("release lock", e))?;

        if released == 1 {
            tracing::debug!("[MUTEX] released {}", self.key);
        } else {
            tracing::debug!("[MUTEX] release of {} found no record", self.key);
        }
        Ok(())
    }

    /// One acquire attempt with a fresh owner token. Returns 0 on success,
    /// otherwise the busy record's remaining TTL in ms. Spawns the lease
    /// extender on success.
    async fn acquire_once(&self) -> Result<i64> {
        let token = Uuid::new_v4();
        let mut conn = connection::acquire(&self.client, "acquire lock").await?;

        let ttl = scripts::acquire(
            &mut conn,
            &self.lock_name(),
            self.lease_duration.as_millis() as u64,
            &token.to_string(),
        )
        .await
        .map_err(|e| Error::transport("acquire lock", e))?;

        if ttl == 0 {
            tracing::debug!("[MUTEX] acquired {} with token {}", self.key, token);
            extender::spawn(
                self.client.clone(),
                self.clock.clone(),
                self.key.clone(),
                self.lock_name(),
                token,
                self.lease_duration,
            );
        }

        Ok(ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> redis::Client {
        redis::Client::open("redis://127.0.0.1:6379").unwrap()
    }

    #[test]
    fn derives_lock_and_channel_names() {
        let mutex = Mutex::new(test_client(), "orders");
        assert_eq!(mutex.lock_name(), "go_redisson_lock:orders");
        assert_eq!(mutex.channel_name(), "go_redisson_lock_channel:orders");
    }

    #[test]
    fn defaults_to_thirty_second_lease() {
        let mutex = Mutex::new(test_client(), "orders");
        assert_eq!(mutex.lease_duration, Duration::from_secs(30));
    }

    #[test]
    fn lease_duration_is_configurable() {
        let mutex =
            Mutex::new(test_client(), "orders").with_lease_duration(Duration::from_secs(5));
        assert_eq!(mutex.lease_duration, Duration::from_secs(5));
    }
}
