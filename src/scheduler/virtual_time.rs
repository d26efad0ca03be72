use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::trace;

use super::{clamp_period, Callback, IntervalCallback, Scheduler, TimeoutCallback, TimerId};

/// Deterministic fake-timer scheduler.
///
/// Time only moves when [`VirtualScheduler::advance`] is called. Timers due at
/// the same instant fire in the order they were scheduled, and an interval is
/// rescheduled after each run so it sorts behind timers queued meanwhile.
pub struct VirtualScheduler {
    inner: RefCell<VirtualInner>,
}

struct VirtualInner {
    origin: DateTime<Utc>,
    elapsed: Duration,
    next_id: u64,
    next_seq: u64,
    timers: HashMap<TimerId, VirtualTimer>,
}

struct VirtualTimer {
    due: Duration,
    seq: u64,
    period: Option<Duration>,
    /// `None` while the callback is running.
    callback: Option<Callback>,
}

impl VirtualScheduler {
    pub fn new(origin: DateTime<Utc>) -> Self {
        Self {
            inner: RefCell::new(VirtualInner {
                origin,
                elapsed: Duration::ZERO,
                next_id: 1,
                next_seq: 0,
                timers: HashMap::new(),
            }),
        }
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        self.inner.borrow().elapsed
    }

    /// Offset from now until the next timer is due.
    pub fn next_due(&self) -> Option<Duration> {
        let inner = self.inner.borrow();
        inner
            .timers
            .values()
            .filter(|timer| timer.callback.is_some())
            .map(|timer| timer.due.saturating_sub(inner.elapsed))
            .min()
    }

    /// Move virtual time forward, firing every timer that falls due.
    ///
    /// Returns the number of callbacks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.inner.borrow().elapsed + by;
        let mut fired = 0;

        while let Some((id, callback)) = self.take_next_due(target) {
            fired += 1;
            match callback {
                Callback::Once(callback) => callback(),
                Callback::Repeat(mut callback) => {
                    callback();
                    let mut inner = self.inner.borrow_mut();
                    let seq = inner.next_seq;
                    if let Some(timer) = inner.timers.get_mut(&id) {
                        let period = timer.period.unwrap_or(Duration::from_millis(1));
                        timer.due += period;
                        timer.seq = seq;
                        timer.callback = Some(Callback::Repeat(callback));
                        inner.next_seq += 1;
                    }
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        if inner.elapsed < target {
            inner.elapsed = target;
        }
        fired
    }

    fn take_next_due(&self, target: Duration) -> Option<(TimerId, Callback)> {
        let mut inner = self.inner.borrow_mut();
        let (id, due) = inner
            .timers
            .iter()
            .filter(|(_, timer)| timer.callback.is_some() && timer.due <= target)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(id, timer)| (*id, timer.due))?;

        inner.elapsed = inner.elapsed.max(due);
        let repeating = inner.timers.get(&id).is_some_and(|t| t.period.is_some());
        let callback = if repeating {
            inner.timers.get_mut(&id).and_then(|t| t.callback.take())
        } else {
            inner.timers.remove(&id).and_then(|t| t.callback)
        };
        let callback = callback?;
        trace!(target: "scheduler", %id, at_ms = due.as_millis() as u64, "virtual timer fired");
        Some((id, callback))
    }

    fn insert(&self, delay: Duration, period: Option<Duration>, callback: Callback) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        let id = TimerId::new(inner.next_id);
        inner.next_id += 1;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let due = inner.elapsed + delay;
        inner.timers.insert(
            id,
            VirtualTimer {
                due,
                seq,
                period,
                callback: Some(callback),
            },
        );
        id
    }
}

impl Scheduler for VirtualScheduler {
    fn set_timeout(&self, delay: Duration, callback: TimeoutCallback) -> TimerId {
        self.insert(delay, None, Callback::Once(callback))
    }

    fn set_interval(&self, period: Duration, callback: IntervalCallback) -> TimerId {
        let period = clamp_period(period);
        self.insert(period, Some(period), Callback::Repeat(callback))
    }

    fn clear(&self, id: TimerId) -> bool {
        self.inner.borrow_mut().timers.remove(&id).is_some()
    }

    fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    fn now(&self) -> DateTime<Utc> {
        let inner = self.inner.borrow();
        let offset = TimeDelta::from_std(inner.elapsed).unwrap_or(TimeDelta::MAX);
        inner.origin + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn scheduler() -> VirtualScheduler {
        VirtualScheduler::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn timeout_fires_once_when_due() {
        let sched = scheduler();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        sched.set_timeout(Duration::from_millis(100), Box::new(move || h.set(h.get() + 1)));

        assert_eq!(sched.advance(Duration::from_millis(99)), 0);
        assert_eq!(sched.advance(Duration::from_millis(1)), 1);
        assert_eq!(sched.advance(Duration::from_secs(10)), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn interval_fires_every_period() {
        let sched = scheduler();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        sched.set_interval(Duration::from_millis(30), Box::new(move || h.set(h.get() + 1)));

        sched.advance(Duration::from_millis(100));
        assert_eq!(hits.get(), 3);
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let sched = scheduler();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = sched.set_timeout(Duration::from_millis(10), Box::new(move || h.set(1)));

        assert!(sched.clear(id));
        assert!(!sched.clear(id));
        sched.advance(Duration::from_secs(1));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn interval_can_clear_itself() {
        let sched = Rc::new(scheduler());
        let hits = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));

        let h = Rc::clone(&hits);
        let own = Rc::clone(&own_id);
        let weak = Rc::downgrade(&sched);
        let id = sched.set_interval(
            Duration::from_millis(10),
            Box::new(move || {
                h.set(h.get() + 1);
                if h.get() == 2 {
                    if let (Some(sched), Some(id)) = (weak.upgrade(), own.get()) {
                        sched.clear(id);
                    }
                }
            }),
        );
        own_id.set(Some(id));

        sched.advance(Duration::from_millis(100));
        assert_eq!(hits.get(), 2);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn same_instant_timers_fire_in_schedule_order() {
        let sched = scheduler();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            sched.set_timeout(Duration::from_millis(5), Box::new(move || order.borrow_mut().push(label)));
        }
        sched.advance(Duration::from_millis(5));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn now_tracks_virtual_time() {
        let sched = scheduler();
        let start = sched.now();
        sched.advance(Duration::from_secs(90));
        assert_eq!((sched.now() - start).num_seconds(), 90);
    }
}
