//! redlease - distributed coordination primitives backed by Redis
//!
//! The core primitive is [`Mutex`], a lease-based distributed lock: the lock
//! record lives in Redis under a TTL, a background task extends the lease
//! while the holder is alive, and blocking acquisition wakes promptly on a
//! per-lock release channel with the TTL as a liveness fallback. A
//! namespaced [`RedisMap`] over hash operations rides along.

pub mod client;
pub mod clock;
pub mod constants;
pub mod error;
pub mod map;
pub mod marshal;
pub mod mutex;

mod connection;

pub use client::Redlease;
pub use clock::{Clock, SimulatedClock, SystemClock, Ticker};
pub use error::{Error, Result};
pub use map::RedisMap;
pub use marshal::{JsonMarshaler, Marshaler};
pub use mutex::Mutex;
