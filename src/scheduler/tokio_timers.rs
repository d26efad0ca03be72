use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use super::{clamp_period, Callback, IntervalCallback, Scheduler, TimeoutCallback, TimerId};

struct TokioTimer {
    callback: Option<Callback>,
    task: JoinHandle<()>,
}

/// Real-time scheduler backed by tokio sleeps.
///
/// Sleeping happens on spawned tasks which only report the id of the timer
/// that fired; callbacks stay on the driving thread and run from
/// [`TokioScheduler::run_due`] or [`TokioScheduler::run_for`].
pub struct TokioScheduler {
    handle: Handle,
    next_id: Cell<u64>,
    timers: RefCell<HashMap<TimerId, TokioTimer>>,
    fired_tx: UnboundedSender<TimerId>,
    fired_rx: RefCell<UnboundedReceiver<TimerId>>,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        let (fired_tx, fired_rx) = unbounded_channel();
        Self {
            handle,
            next_id: Cell::new(1),
            timers: RefCell::new(HashMap::new()),
            fired_tx,
            fired_rx: RefCell::new(fired_rx),
        }
    }

    fn next_id(&self) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TimerId::new(id)
    }

    /// Run callbacks for every timer that has fired so far.
    ///
    /// Returns the number of callbacks that ran.
    pub fn run_due(&self) -> usize {
        let mut fired = Vec::new();
        {
            let mut rx = self.fired_rx.borrow_mut();
            while let Ok(id) = rx.try_recv() {
                fired.push(id);
            }
        }

        fired.into_iter().filter(|id| self.fire(*id)).count()
    }

    /// Drive timers for `duration` of real time.
    pub async fn run_for(&self, duration: Duration) -> usize {
        let deadline = Instant::now() + duration;
        let mut ran = 0;
        loop {
            let next = {
                let mut rx = self.fired_rx.borrow_mut();
                tokio::time::timeout_at(deadline, rx.recv()).await
            };
            match next {
                Ok(Some(id)) => {
                    if self.fire(id) {
                        ran += 1;
                    }
                }
                Ok(None) | Err(_) => break,
            }
        }
        ran
    }

    fn fire(&self, id: TimerId) -> bool {
        let callback = {
            let mut timers = self.timers.borrow_mut();
            let repeating = match timers.get(&id) {
                Some(TokioTimer {
                    callback: Some(Callback::Repeat(_)),
                    ..
                }) => true,
                Some(TokioTimer { callback: Some(_), .. }) => false,
                // Cleared, or a tick arrived while the callback was running.
                _ => return false,
            };
            if repeating {
                timers.get_mut(&id).and_then(|timer| timer.callback.take())
            } else {
                timers.remove(&id).and_then(|timer| timer.callback)
            }
        };

        trace!(target: "scheduler", %id, "timer fired");
        match callback {
            Some(Callback::Once(callback)) => callback(),
            Some(Callback::Repeat(mut callback)) => {
                callback();
                if let Some(timer) = self.timers.borrow_mut().get_mut(&id) {
                    timer.callback = Some(Callback::Repeat(callback));
                }
            }
            None => return false,
        }
        true
    }
}

impl Scheduler for TokioScheduler {
    fn set_timeout(&self, delay: Duration, callback: TimeoutCallback) -> TimerId {
        let id = self.next_id();
        let tx = self.fired_tx.clone();
        let task = self.handle.spawn(async move {
            sleep(delay).await;
            let _ = tx.send(id);
        });
        self.timers.borrow_mut().insert(
            id,
            TokioTimer {
                callback: Some(Callback::Once(callback)),
                task,
            },
        );
        id
    }

    fn set_interval(&self, period: Duration, callback: IntervalCallback) -> TimerId {
        let id = self.next_id();
        let period = clamp_period(period);
        let tx = self.fired_tx.clone();
        let task = self.handle.spawn(async move {
            loop {
                sleep(period).await;
                if tx.send(id).is_err() {
                    break;
                }
            }
        });
        self.timers.borrow_mut().insert(
            id,
            TokioTimer {
                callback: Some(Callback::Repeat(callback)),
                task,
            },
        );
        id
    }

    fn clear(&self, id: TimerId) -> bool {
        match self.timers.borrow_mut().remove(&id) {
            Some(timer) => {
                timer.task.abort();
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        let timers = std::mem::take(self.timers.get_mut());
        if !timers.is_empty() {
            debug!(target: "scheduler", count = timers.len(), "aborting outstanding timers");
        }
        for (_, timer) in timers {
            timer.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[tokio::test(start_paused = true)]
    async fn timeout_runs_on_driving_thread() {
        let sched = TokioScheduler::new(Handle::current());
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        sched.set_timeout(Duration::from_millis(50), Box::new(move || h.set(h.get() + 1)));

        let ran = sched.run_for(Duration::from_millis(200)).await;
        assert_eq!(ran, 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_interval_stops_firing() {
        let sched = TokioScheduler::new(Handle::current());
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = sched.set_interval(Duration::from_millis(100), Box::new(move || h.set(h.get() + 1)));

        sched.run_for(Duration::from_millis(350)).await;
        assert_eq!(hits.get(), 3);

        assert!(sched.clear(id));
        sched.run_for(Duration::from_millis(500)).await;
        assert_eq!(hits.get(), 3);
        assert_eq!(sched.pending(), 0);
    }
}
