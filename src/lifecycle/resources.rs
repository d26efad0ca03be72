use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use crate::bus::{EventBus, ListenerId, Notification};
use crate::scheduler::{SharedScheduler, TimerId};
use crate::util::{Debounced, Throttled};

/// Timers and bus listeners owned by one fragment instance.
///
/// Everything registered through this handle is cancelled by
/// [`InstanceResources::release`], which the registry calls on destroy, and
/// again when the last handle is dropped. After release, new registrations
/// are refused.
///
/// Callbacks scheduled here run with the bus held, so notifications they
/// emit are delivered after the callback returns.
#[derive(Clone)]
pub struct InstanceResources {
    inner: Rc<ResourcesInner>,
}

/// Non-owning handle for callbacks that must not keep the instance alive.
#[derive(Clone)]
pub struct WeakResources {
    inner: Weak<ResourcesInner>,
}

impl WeakResources {
    pub fn upgrade(&self) -> Option<InstanceResources> {
        self.inner.upgrade().map(|inner| InstanceResources { inner })
    }
}

struct ResourcesInner {
    scheduler: SharedScheduler,
    bus: EventBus,
    timers: RefCell<Vec<TimerId>>,
    listeners: RefCell<Vec<ListenerId>>,
    released: Cell<bool>,
}

impl InstanceResources {
    pub fn new(scheduler: SharedScheduler, bus: EventBus) -> Self {
        Self {
            inner: Rc::new(ResourcesInner {
                scheduler,
                bus,
                timers: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                released: Cell::new(false),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakResources {
        WeakResources {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn set_timeout(&self, delay: Duration, callback: impl FnOnce() + 'static) -> Option<TimerId> {
        if self.is_released() {
            return None;
        }
        let slot: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let own = Rc::clone(&slot);
        let weak: Weak<ResourcesInner> = Rc::downgrade(&self.inner);
        let bus = self.inner.bus.clone();
        let id = self.inner.scheduler.set_timeout(
            delay,
            Box::new(move || {
                if let (Some(inner), Some(id)) = (weak.upgrade(), own.get()) {
                    inner.forget_timer(id);
                }
                let _hold = bus.hold();
                callback();
            }),
        );
        slot.set(Some(id));
        self.inner.timers.borrow_mut().push(id);
        Some(id)
    }

    pub fn set_interval(&self, period: Duration, mut callback: impl FnMut() + 'static) -> Option<TimerId> {
        if self.is_released() {
            return None;
        }
        let bus = self.inner.bus.clone();
        let id = self.inner.scheduler.set_interval(
            period,
            Box::new(move || {
                let _hold = bus.hold();
                callback();
            }),
        );
        self.inner.timers.borrow_mut().push(id);
        Some(id)
    }

    /// Cancel one owned timer.
    pub fn clear(&self, id: TimerId) -> bool {
        self.inner.forget_timer(id);
        self.inner.scheduler.clear(id)
    }

    pub fn subscribe(&self, listener: impl FnMut(&Notification) + 'static) -> Option<ListenerId> {
        if self.is_released() {
            return None;
        }
        let id = self.inner.bus.subscribe(listener);
        self.inner.listeners.borrow_mut().push(id);
        Some(id)
    }

    /// Debouncer whose callback runs with the bus held. Cancelled on drop.
    pub fn debounce<A: 'static>(&self, wait: Duration, mut func: impl FnMut(A) + 'static) -> Debounced<A> {
        let bus = self.inner.bus.clone();
        Debounced::new(self.inner.scheduler.clone(), wait, move |args| {
            let _hold = bus.hold();
            func(args);
        })
    }

    pub fn throttle<A: 'static>(&self, limit: Duration, func: impl FnMut(A) + 'static) -> Throttled<A> {
        Throttled::new(self.inner.scheduler.clone(), limit, func)
    }

    pub fn active_timers(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }

    /// Cancel every owned timer and detach every listener. Returns how many
    /// registrations were released.
    pub fn release(&self) -> usize {
        self.inner.release()
    }
}

impl ResourcesInner {
    fn forget_timer(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|existing| *existing != id);
    }

    fn release(&self) -> usize {
        self.released.set(true);
        let timers: Vec<TimerId> = self.timers.borrow_mut().drain(..).collect();
        let listeners: Vec<ListenerId> = self.listeners.borrow_mut().drain(..).collect();
        for id in &timers {
            self.scheduler.clear(*id);
        }
        for id in &listeners {
            self.bus.unsubscribe(*id);
        }
        let released = timers.len() + listeners.len();
        if released > 0 {
            debug!(target: "lifecycle", timers = timers.len(), listeners = listeners.len(), "released");
        }
        released
    }
}

impl Drop for ResourcesInner {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::scheduler::{Scheduler, VirtualScheduler};

    fn setup() -> (Rc<VirtualScheduler>, EventBus, InstanceResources) {
        let scheduler = Rc::new(VirtualScheduler::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        ));
        let bus = EventBus::new();
        let resources = InstanceResources::new(scheduler.clone(), bus.clone());
        (scheduler, bus, resources)
    }

    #[test]
    fn fired_timeouts_are_forgotten() {
        let (scheduler, _bus, resources) = setup();
        resources.set_timeout(Duration::from_millis(10), || {});
        assert_eq!(resources.active_timers(), 1);
        scheduler.advance(Duration::from_millis(10));
        assert_eq!(resources.active_timers(), 0);
    }

    #[test]
    fn release_cancels_timers_and_listeners() {
        let (scheduler, bus, resources) = setup();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        resources.set_interval(Duration::from_millis(5), move || f.set(f.get() + 1));
        resources.set_timeout(Duration::from_millis(50), || {});
        resources.subscribe(|_| {});

        assert_eq!(resources.release(), 3);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(bus.listener_count(), 0);

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(fired.get(), 0);
        assert!(resources.set_timeout(Duration::from_millis(1), || {}).is_none());
    }

    #[test]
    fn dropping_last_handle_releases() {
        let (scheduler, bus, resources) = setup();
        resources.set_interval(Duration::from_millis(5), || {});
        resources.subscribe(|_| {});
        drop(resources);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn timer_emits_are_delivered_after_callback() {
        let (scheduler, bus, resources) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        bus.subscribe(move |_| o.borrow_mut().push("listener"));
        let o = Rc::clone(&order);
        let emitter = bus.clone();
        resources.set_timeout(Duration::from_millis(1), move || {
            emitter.emit(Notification::VisibilityChanged { hidden: false });
            o.borrow_mut().push("callback end");
        });
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*order.borrow(), vec!["callback end", "listener"]);
    }
}
