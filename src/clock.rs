//! Clock abstraction for time-dependent behavior
//!
//! Every wait inside the library (lease extender ticks, TTL fallback sleeps)
//! goes through an injected [`Clock`] so tests can drive time manually. The
//! production implementation delegates to the tokio timer; [`SimulatedClock`]
//! advances only when told to.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

/// Injected time source. Implementations must be cheap to share across tasks.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the calling task for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by the tokio timer. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Periodic timer built on a [`Clock`].
///
/// Unlike `tokio::time::interval` this does not try to catch up on missed
/// ticks; each tick waits a full period from the previous wakeup.
pub struct Ticker {
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl Ticker {
    /// Create a ticker with the given period.
    pub fn new(clock: Arc<dyn Clock>, period: Duration) -> Self {
        Self { clock, period }
    }

    /// Wait for the next tick.
    pub async fn tick(&self) {
        self.clock.sleep(self.period).await;
    }
}

/// Simulated clock for deterministic time control in tests.
///
/// Sleepers register a virtual deadline and suspend until [`advance`]
/// moves the clock past it. `advance` steps through intermediate deadlines
/// in order, yielding to the scheduler after each step so a task that
/// re-arms a timer (e.g. a ticker) observes the intermediate instants
/// rather than a single jump.
///
/// [`advance`]: SimulatedClock::advance
pub struct SimulatedClock {
    state: Mutex<SimState>,
}

struct SimState {
    elapsed_ms: u64,
    waiters: Vec<Waiter>,
}

struct Waiter {
    deadline_ms: u64,
    tx: oneshot::Sender<()>,
}

impl SimulatedClock {
    /// Create a clock at virtual time zero with no sleepers.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                elapsed_ms: 0,
                waiters: Vec::new(),
            }),
        }
    }

    /// Returns elapsed virtual time since the clock was created.
    pub fn elapsed(&self) -> Duration {
        let state = self.state.lock().expect("simulated clock lock poisoned");
        Duration::from_millis(state.elapsed_ms)
    }

    /// Advance the clock by the given duration, waking every sleeper whose
    /// deadline falls within the window.
    ///
    /// Deadlines are visited in order. After waking the sleepers due at each
    /// step the task yields, giving woken tasks a chance to run and register
    /// follow-up sleeps before the clock moves again.
    pub async fn advance(&self, duration: Duration) {
        let target_ms = {
            let state = self.state.lock().expect("simulated clock lock poisoned");
            state.elapsed_ms + duration.as_millis() as u64
        };

        loop {
            let due = {
                let mut state = self.state.lock().expect("simulated clock lock poisoned");
                let next_deadline = state
                    .waiters
                    .iter()
                    .map(|w| w.deadline_ms)
                    .filter(|d| *d <= target_ms)
                    .min();

                match next_deadline {
                    Some(deadline) => {
                        state.elapsed_ms = deadline;
                        let (due, rest): (Vec<Waiter>, Vec<Waiter>) =
                            std::mem::take(&mut state.waiters)
                                .into_iter()
                                .partition(|w| w.deadline_ms <= deadline);
                        state.waiters = rest;
                        due
                    }
                    None => {
                        state.elapsed_ms = target_ms;
                        break;
                    }
                }
            };

            for waiter in due {
                // Receiver may have been dropped by a select! that already
                // resolved another way.
                let _ = waiter.tx.send(());
            }

            tokio::task::yield_now().await;
        }
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for SimulatedClock {
    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }

        let rx = {
            let mut state = self.state.lock().expect("simulated clock lock poisoned");
            let (tx, rx) = oneshot::channel();
            let deadline_ms = state.elapsed_ms + duration.as_millis() as u64;
            state.waiters.push(Waiter { deadline_ms, tx });
            rx
        };

        // An error means the clock was dropped mid-sleep; treat as woken.
        let _ = rx.await;
    }
}
