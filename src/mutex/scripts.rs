//! Atomic server-side lock primitives
//!
//! Each operation runs as a single Lua script so the read-check-write
//! sequences are atomic from every client's point of view.

use redis::aio::MultiplexedConnection;
use redis::{RedisResult, Script};
use std::sync::LazyLock;

/// Acquire: claim the lock if free, otherwise report the remaining lease.
///
/// KEYS[1] = lock record, ARGV[1] = lease ttl in ms, ARGV[2] = owner token.
/// Returns 0 when acquired; otherwise the record's PTTL in ms.
static ACQUIRE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
	if redis.call('exists', KEYS[1]) == 0 then
		redis.call('set', KEYS[1], ARGV[2])
		redis.call('pexpire', KEYS[1], ARGV[1])
		return 0
	end
	return redis.call('pttl', KEYS[1])",
    )
});

/// Release: delete the record and notify waiters.
///
/// KEYS[1] = lock record, KEYS[2] = release channel, ARGV[1] = payload.
/// Returns 1 when a record was deleted, 0 when the lock was already free.
/// Does not compare the owner token.
static RELEASE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
	if redis.call('exists', KEYS[1]) == 0 then
		return 0
	end
	redis.call('del', KEYS[1])
	redis.call('publish', KEYS[2], ARGV[1])
	return 1",
    )
});

/// Extend: refresh the lease, but only for the current owner.
///
/// KEYS[1] = lock record, ARGV[1] = lease ttl in ms, ARGV[2] = owner token.
/// Returns 1 when refreshed, 0 when the token no longer owns the record.
static EXTEND: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
	if redis.call('get', KEYS[1]) == ARGV[2] then
		redis.call('pexpire', KEYS[1], ARGV[1])
		return 1
	end
	return 0",
    )
});

/// Run the acquire script. Returns 0 on success or the busy record's PTTL.
pub(crate) async fn acquire(
    conn: &mut MultiplexedConnection,
    lock_key: &str,
    ttl_ms: u64,
    token: &str,
) -> RedisResult<i64> {
    ACQUIRE
        .key(lock_key)
        .arg(ttl_ms)
        .arg(token)
        .invoke_async(conn)
        .await
}

/// Run the release script. Returns whether a record was deleted.
pub(crate) async fn release(
    conn: &mut MultiplexedConnection,
    lock_key: &str,
    channel: &str,
    payload: &str,
) -> RedisResult<i64> {
    RELEASE
        .key(lock_key)
        .key(channel)
        .arg(payload)
        .invoke_async(conn)
        .await
}

/// Run the extend script. Returns whether the lease was refreshed.
pub(crate) async fn extend(
    conn: &mut MultiplexedConnection,
    lock_key: &str,
    ttl_ms: u64,
    token: &str,
) -> RedisResult<i64> {
    EXTEND
        .key(lock_key)
        .arg(ttl_ms)
        .arg(token)
        .invoke_async(conn)
        .await
}
