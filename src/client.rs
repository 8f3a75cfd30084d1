//! Top-level entry point
//!
//! Wraps a [`redis::Client`] and hands out the coordination primitives built
//! on it. All primitives created from one `Redlease` share the underlying
//! client and its connection pool.

use crate::error::{Error, Result};
use crate::map::RedisMap;
use crate::mutex::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Factory for coordination primitives over a shared Redis client.
#[derive(Clone, Debug)]
pub struct Redlease {
    client: redis::Client,
}

impl Redlease {
    /// Wrap an existing client.
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    /// Open a client for `url` and verify the connection with a PING.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::transport("connect", e))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::transport("connect", e))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::transport("connect", e))?;
        if pong != "PONG" {
            return Err(Error::internal(format!(
                "unexpected ping reply: {:?}",
                pong
            )));
        }

        tracing::info!("[REDLEASE] connected to {}", url);
        Ok(Self { client })
    }

    /// The underlying client.
    pub fn client(&self) -> &redis::Client {
        &self.client
    }

    /// Create a distributed lock handle for a logical key.
    pub fn mutex(&self, key: impl Into<String>) -> Mutex {
        Mutex::new(self.client.clone(), key)
    }

    /// Create a distributed lock handle with builder options applied.
    ///
    /// ```rust,ignore
    /// let mutex = redlease.mutex_with("orders", |m| {
    ///     m.with_lease_duration(Duration::from_secs(10))
    /// });
    /// ```
    pub fn mutex_with(
        &self,
        key: impl Into<String>,
        configure: impl FnOnce(Mutex) -> Mutex,
    ) -> Mutex {
        configure(Mutex::new(self.client.clone(), key))
    }

    /// Create a namespaced map.
    pub fn map<K, V>(&self, namespace: impl Into<String>) -> RedisMap<K, V>
    where
        K: Serialize + DeserializeOwned + Send + Sync + 'static,
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        RedisMap::new(self.client.clone(), namespace)
    }
}
