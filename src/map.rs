//! Namespaced key/value map backed by Redis hashes
//!
//! Each map occupies a single hash whose key is the namespace; logical keys
//! become hash fields. Keys and values pass through pluggable [`Marshaler`]s,
//! JSON by default.

use crate::connection;
use crate::error::{Error, Result};
use crate::marshal::{JsonMarshaler, Marshaler};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Map data structure backed by a Redis hash.
///
/// Cheap to clone; clones share the underlying client.
#[derive(Clone)]
pub struct RedisMap<K, V> {
    client: redis::Client,
    namespace: String,
    key_marshaler: Arc<dyn Marshaler<K>>,
    value_marshaler: Arc<dyn Marshaler<V>>,
}

impl<K, V> RedisMap<K, V>
where
    K: Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a map over the given namespace. Uses JSON marshalers for both
    /// keys and values.
    pub fn new(client: redis::Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            key_marshaler: Arc::new(JsonMarshaler),
            value_marshaler: Arc::new(JsonMarshaler),
        }
    }

    /// Replace the key marshaler.
    pub fn with_key_marshaler(mut self, marshaler: Arc<dyn Marshaler<K>>) -> Self {
        self.key_marshaler = marshaler;
        self
    }

    /// Replace the value marshaler.
    pub fn with_value_marshaler(mut self, marshaler: Arc<dyn Marshaler<V>>) -> Self {
        self.value_marshaler = marshaler;
        self
    }

    /// The namespace (hash key) this map lives under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Retrieve a value. Returns `None` when the key has never been set or
    /// has been removed.
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let field = self.key_marshaler.marshal(key)?;
        let mut conn = connection::acquire(&self.client, "map get").await?;

        let raw: Option<String> = redis::cmd("HGET")
            .arg(&self.namespace)
            .arg(&field)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!("[MAP] HGET failed for {}:{}: {}", self.namespace, field, e);
                Error::transport("map get", e)
            })?;

        match raw {
            Some(raw) => Ok(Some(self.value_marshaler.unmarshal(&raw)?)),
            None => Ok(None),
        }
    }

    /// Insert or overwrite a key/value pair.
    pub async fn insert(&self, key: &K, value: &V) -> Result<()> {
        let field = self.key_marshaler.marshal(key)?;
        let raw = self.value_marshaler.marshal(value)?;
        let mut conn = connection::acquire(&self.client, "map insert").await?;

        redis::cmd("HSET")
            .arg(&self.namespace)
            .arg(&field)
            .arg(&raw)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!("[MAP] HSET failed for {}:{}: {}", self.namespace, field, e);
                Error::transport("map insert", e)
            })?;

        Ok(())
    }

    /// Remove a key/value pair. Removing an absent key is a no-op.
    pub async fn remove(&self, key: &K) -> Result<()> {
        let field = self.key_marshaler.marshal(key)?;
        let mut conn = connection::acquire(&self.client, "map remove").await?;

        redis::cmd("HDEL")
            .arg(&self.namespace)
            .arg(&field)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!("[MAP] HDEL failed for {}:{}: {}", self.namespace, field, e);
                Error::transport("map remove", e)
            })?;

        Ok(())
    }
}
