//! Library-wide constants and default values
//!
//! Centralizes wire-level names and timing defaults so the key schema and
//! timeouts stay consistent across the codebase.

use std::time::Duration;

// ============================================================================
// Lease Timing
// ============================================================================

/// Default TTL placed on a lock record.
///
/// This is the upper bound on how long a lock appears held after its owner
/// abandons it (process crash, network partition). While the owner is alive
/// the lease extender refreshes the TTL well before it elapses.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(30);

/// Divisor applied to the lease duration to derive the extender tick period.
///
/// Ticking at a third of the lease gives two full refresh opportunities
/// before expiry, so a single transient network blip does not lose the lease.
pub const LEASE_TICKS_PER_DURATION: u32 = 3;

// ============================================================================
// Connection Handling
// ============================================================================

/// Upper bound on acquiring a multiplexed connection from the Redis client.
///
/// Prevents indefinite blocking when the server is unreachable; surfaced to
/// callers as a transport error on the operation that needed the connection.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Key Schema
// ============================================================================

/// Prefix for lock record keys. The record's existence means the lock is
/// held; its value is the current owner token.
pub const LOCK_KEY_PREFIX: &str = "go_redisson_lock:";

/// Prefix for per-lock release notification channels.
pub const LOCK_CHANNEL_PREFIX: &str = "go_redisson_lock_channel:";

/// Payload published on the release channel when a lock is freed.
pub const UNLOCK_MESSAGE: &str = "unlocked";
