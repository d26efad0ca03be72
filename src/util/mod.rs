//! Utility layer shared by every fragment.
//!
//! [`Utils`] is handed to each fragment through its context instead of living
//! in a global namespace, so a test can swap the scheduler or the breakpoint
//! table per page.

mod breakpoint;
mod debounce;
mod media_time;
mod relative_time;
mod throttle;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scheduler::SharedScheduler;

pub use breakpoint::{BreakpointError, BreakpointPreset, BreakpointTable, Tier};
pub use debounce::Debounced;
pub use media_time::format_media_time;
pub use relative_time::{
    format_relative_time, is_recent_label, parse_timestamp, RelativeTimeStyle, TimeParseError,
};
pub use throttle::Throttled;

pub struct Utils {
    scheduler: SharedScheduler,
    breakpoints: BreakpointTable,
}

impl Utils {
    pub fn new(scheduler: SharedScheduler, breakpoints: BreakpointTable) -> Self {
        Self {
            scheduler,
            breakpoints,
        }
    }

    pub fn debounce<A: 'static>(&self, wait: Duration, func: impl FnMut(A) + 'static) -> Debounced<A> {
        Debounced::new(self.scheduler.clone(), wait, func)
    }

    pub fn throttle<A: 'static>(&self, limit: Duration, func: impl FnMut(A) + 'static) -> Throttled<A> {
        Throttled::new(self.scheduler.clone(), limit, func)
    }

    /// Page-level breakpoint for a viewport width.
    pub fn breakpoint(&self, width: u32) -> &str {
        self.breakpoints.resolve(width)
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.breakpoints
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.scheduler.now()
    }

    /// Compact relative label measured against the scheduler clock.
    pub fn relative_time(&self, reference: DateTime<Utc>) -> String {
        format_relative_time(reference, self.now())
    }

    pub fn relative_time_with(&self, style: RelativeTimeStyle, reference: DateTime<Utc>) -> String {
        style.format(reference, self.now())
    }
}
