use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::{SharedScheduler, TimerId};

/// Leading-edge throttle: the first call runs immediately and opens a
/// cooldown of `limit`; calls during the cooldown are dropped, not queued.
///
/// Dropping the wrapper cancels the cooldown timer.
pub struct Throttled<A: 'static> {
    inner: Rc<ThrottleInner<A>>,
}

struct ThrottleInner<A> {
    scheduler: SharedScheduler,
    limit: Duration,
    cooldown: Cell<Option<TimerId>>,
    func: RefCell<Box<dyn FnMut(A)>>,
}

impl<A: 'static> Throttled<A> {
    pub fn new(scheduler: SharedScheduler, limit: Duration, func: impl FnMut(A) + 'static) -> Self {
        Self {
            inner: Rc::new(ThrottleInner {
                scheduler,
                limit,
                cooldown: Cell::new(None),
                func: RefCell::new(Box::new(func)),
            }),
        }
    }

    /// Returns true when the call went through.
    pub fn call(&self, args: A) -> bool {
        if self.is_cooling_down() {
            return false;
        }

        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.scheduler.set_timeout(
            self.inner.limit,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.cooldown.set(None);
                }
            }),
        );
        // Cooldown is armed before the call so a re-entrant call is dropped.
        self.inner.cooldown.set(Some(id));
        (self.inner.func.borrow_mut())(args);
        true
    }

    pub fn is_cooling_down(&self) -> bool {
        self.inner.cooldown.get().is_some()
    }
}

impl<A: 'static> Drop for Throttled<A> {
    fn drop(&mut self) {
        if let Some(id) = self.inner.cooldown.take() {
            self.inner.scheduler.clear(id);
        }
    }
}
