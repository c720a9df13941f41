//! # Timer Module - Scoped Periodic Intervals
//!
//! The session drives two independent clocks: a slow one for the elapsed time and
//! timeout, and a fast one for particles. Neither runs on its own thread. The host
//! polls the session, and each [`Interval`] reports how many of its periods have
//! passed since it was last polled.
//!
//! Intervals live in a [`TimerSlot`] owned by whoever needs them, so cancelling is
//! just emptying the slot. A stale interval can never fire into a later session.
//!
//! ```rust
//! use rote::timer::TimerSlot;
//! use web_time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut slot = TimerSlot::default();
//! slot.arm(Duration::from_secs(1), start);
//!
//! assert_eq!(slot.poll(start + Duration::from_millis(500)), 0);
//! assert_eq!(slot.poll(start + Duration::from_millis(3200)), 3);
//!
//! slot.cancel();
//! assert_eq!(slot.poll(start + Duration::from_secs(10)), 0);
//! ```

use web_time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A periodic interval anchored at the instant it was armed
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period: Duration,
    next_due: Instant,
}

impl Interval {
    /// Starts an interval whose first tick is one `period` after `now`
    pub fn start(period: Duration, now: Instant) -> Self {
        let period = period.max(MIN_PERIOD);
        Self {
            period,
            next_due: now + period,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns the number of ticks due at `now` and advances past them
    pub fn poll(&mut self, now: Instant) -> u32 {
        if now < self.next_due {
            return 0;
        }

        let overdue = now.duration_since(self.next_due).as_nanos() / self.period.as_nanos();
        let ticks = u32::try_from(overdue.saturating_add(1)).unwrap_or(u32::MAX);

        self.next_due += self.period.saturating_mul(ticks);
        ticks
    }
}

/// An optional, owned [`Interval`]
#[derive(Debug, Default, Clone, Copy)]
pub struct TimerSlot(Option<Interval>);

impl TimerSlot {
    /// Arms the slot, replacing any interval already in it
    pub fn arm(&mut self, period: Duration, now: Instant) {
        self.0 = Some(Interval::start(period, now));
    }

    /// Arms the slot only if it is empty
    pub fn ensure_armed(&mut self, period: Duration, now: Instant) {
        if self.0.is_none() {
            self.arm(period, now);
        }
    }

    pub fn cancel(&mut self) {
        self.0 = None;
    }

    pub const fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    /// Ticks due at `now`. Always 0 for an empty slot.
    pub fn poll(&mut self, now: Instant) -> u32 {
        self.0.as_mut().map_or(0, |interval| interval.poll(now))
    }
}
