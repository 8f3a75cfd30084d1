//! Shared helpers for integration tests
//!
//! Tests run against a real local Redis instance. Requires Redis on
//! localhost:6379 unless `REDIS_URL` points elsewhere.
#![allow(dead_code)]

use std::future::Future;
use std::sync::Once;
use std::time::{Duration, Instant};

static TRACING: Once = Once::new();

/// Install a subscriber honoring `RUST_LOG` so test failures come with the
/// library's diagnostics
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Get Redis URL from environment or default to localhost
pub fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// Open a client against the test Redis
pub fn client() -> redis::Client {
    redis::Client::open(redis_url()).expect("failed to open redis client")
}

/// Check if Redis is available
pub async fn redis_available() -> bool {
    let Ok(client) = redis::Client::open(redis_url()) else {
        return false;
    };
    let Ok(mut conn) = client.get_multiplexed_async_connection().await else {
        return false;
    };
    redis::cmd("PING")
        .query_async::<String>(&mut conn)
        .await
        .is_ok()
}

/// Skip the test when Redis is not reachable
macro_rules! skip_if_no_redis {
    () => {
        crate::common::init_tracing();
        if !crate::common::redis_available().await {
            eprintln!("skipping test: Redis not available on {}", crate::common::redis_url());
            return;
        }
    };
}
pub(crate) use skip_if_no_redis;

/// A lock name no other test run will collide with
pub fn random_key(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

/// Number of subscribers currently on a pub/sub channel
pub async fn subscriber_count(client: &redis::Client, channel: &str) -> i64 {
    let mut conn = client
        .get_multiplexed_async_connection()
        .await
        .expect("failed to connect");
    let counts: Vec<(String, i64)> = redis::cmd("PUBSUB")
        .arg("NUMSUB")
        .arg(channel)
        .query_async(&mut conn)
        .await
        .expect("PUBSUB NUMSUB failed");
    counts
        .into_iter()
        .find(|(name, _)| name == channel)
        .map(|(_, count)| count)
        .unwrap_or(0)
}

/// Poll a condition until it holds or the deadline passes
pub async fn eventually<F, Fut>(mut condition: F, deadline: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
