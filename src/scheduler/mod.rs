//! Deferred-callback facility provided by the host.
//!
//! Fragments never sleep or spawn: every delay goes through a [`Scheduler`]
//! so the same code runs against real time ([`TokioScheduler`]) and against
//! fake timers in tests ([`VirtualScheduler`]).

mod tokio_timers;
mod virtual_time;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use tokio_timers::TokioScheduler;
pub use virtual_time::VirtualScheduler;

/// Opaque handle to a scheduled timeout or interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

pub type TimeoutCallback = Box<dyn FnOnce()>;
pub type IntervalCallback = Box<dyn FnMut()>;

/// Single-threaded timer facility.
///
/// Callbacks run on the thread that drives the scheduler, one at a time.
/// A callback may schedule or clear timers (including its own) while it runs.
pub trait Scheduler {
    /// Run `callback` once after `delay`.
    fn set_timeout(&self, delay: Duration, callback: TimeoutCallback) -> TimerId;

    /// Run `callback` every `period` until cleared.
    fn set_interval(&self, period: Duration, callback: IntervalCallback) -> TimerId;

    /// Cancel a timer. Returns false if it already fired or was cleared.
    fn clear(&self, id: TimerId) -> bool;

    /// Number of timers that can still fire.
    fn pending(&self) -> usize;

    /// Wall-clock time as seen by this scheduler.
    fn now(&self) -> DateTime<Utc>;
}

pub type SharedScheduler = Rc<dyn Scheduler>;

pub(crate) enum Callback {
    Once(TimeoutCallback),
    Repeat(IntervalCallback),
}

/// Intervals of zero length would spin forever.
pub(crate) fn clamp_period(period: Duration) -> Duration {
    period.max(Duration::from_millis(1))
}
