//! Blocking rate gate over upstream requests.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tracing::debug;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Instance-scoped rate gate shared by the providers of one source.
///
/// `acquire` blocks the calling thread until budget is available; requests
/// are delayed, never dropped and never failed. The gate is passed by
/// reference to whoever needs it, not reached through globals, so tests can
/// construct isolated gates with tight quotas.
#[derive(Clone)]
pub struct RateGate {
    limiter: Arc<DirectRateLimiter>,
    clock: DefaultClock,
}

impl RateGate {
    /// Allows `quota_limit` requests per `quota_window`, spread evenly with
    /// burst capacity of the full limit.
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        let clock = DefaultClock::default();
        let quota = quota_from_window(quota_window, quota_limit);
        Self {
            limiter: Arc::new(RateLimiter::direct_with_clock(quota, &clock)),
            clock,
        }
    }

    /// Blocks until a unit of rate budget is available.
    pub fn acquire(&self) {
        loop {
            match self.limiter.check() {
                Ok(()) => return,
                Err(not_until) => {
                    let wait = not_until
                        .wait_time_from(self.clock.now())
                        .max(Duration::from_millis(1));
                    debug!(wait_ms = wait.as_millis() as u64, "rate gate blocking");
                    thread::sleep(wait);
                }
            }
        }
    }

    /// Non-blocking probe, used by tests to observe budget exhaustion.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}
