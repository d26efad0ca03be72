use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::scheduler::{SharedScheduler, TimerId};

/// Trailing-edge debounce: each call restarts the countdown and only the
/// last call of a burst reaches the wrapped function, with its arguments.
///
/// Dropping the wrapper cancels any pending invocation.
pub struct Debounced<A: 'static> {
    inner: Rc<DebounceInner<A>>,
}

struct DebounceInner<A> {
    scheduler: SharedScheduler,
    wait: Duration,
    pending: Cell<Option<TimerId>>,
    func: RefCell<Box<dyn FnMut(A)>>,
}

impl<A: 'static> Debounced<A> {
    pub fn new(scheduler: SharedScheduler, wait: Duration, func: impl FnMut(A) + 'static) -> Self {
        Self {
            inner: Rc::new(DebounceInner {
                scheduler,
                wait,
                pending: Cell::new(None),
                func: RefCell::new(Box::new(func)),
            }),
        }
    }

    pub fn call(&self, args: A) {
        self.cancel();
        let weak = Rc::downgrade(&self.inner);
        let id = self.inner.scheduler.set_timeout(
            self.inner.wait,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.pending.set(None);
                    (inner.func.borrow_mut())(args);
                }
            }),
        );
        self.inner.pending.set(Some(id));
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) -> bool {
        match self.inner.pending.take() {
            Some(id) => self.inner.scheduler.clear(id),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }
}

impl<A: 'static> Drop for Debounced<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}
