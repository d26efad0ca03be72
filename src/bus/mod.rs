//! Typed broadcast bus shared by the fragments on a page.
//!
//! Delivery is synchronous but never re-entrant: a notification emitted while
//! another is being dispatched (or while a [`BusHold`] is alive) is queued and
//! delivered once the current dispatch unwinds. Within one notification,
//! listeners run in subscription order.

mod notification;

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{trace, warn};

pub use notification::{MediaKind, Notification, ReadySummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<RefCell<dyn FnMut(&Notification)>>;

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

#[derive(Default)]
struct BusInner {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    queue: RefCell<VecDeque<Notification>>,
    dispatching: Cell<bool>,
    holds: Cell<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut(&Notification) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.inner.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Returns false if the listener was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn emit(&self, notification: Notification) {
        self.inner.queue.borrow_mut().push_back(notification);
        if self.inner.dispatching.get() || self.inner.holds.get() > 0 {
            return;
        }
        self.flush();
    }

    /// Defer delivery until the returned guard is dropped.
    pub fn hold(&self) -> BusHold {
        self.inner.holds.set(self.inner.holds.get() + 1);
        BusHold { bus: self.clone() }
    }

    fn flush(&self) {
        self.inner.dispatching.set(true);
        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(notification) = next else {
                break;
            };
            trace!(target: "bus", event = notification.name(), "dispatch");

            let snapshot: Vec<(ListenerId, Listener)> = self.inner.listeners.borrow().clone();
            for (id, listener) in snapshot {
                // Unsubscribed by an earlier listener for this notification.
                if !self.is_subscribed(id) {
                    continue;
                }
                match listener.try_borrow_mut() {
                    Ok(mut listener) => listener(&notification),
                    Err(_) => warn!(target: "bus", ?id, "listener busy, notification skipped"),
                }
            }
        }
        self.inner.dispatching.set(false);
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow().iter().any(|(existing, _)| *existing == id)
    }
}

/// Guard returned by [`EventBus::hold`].
pub struct BusHold {
    bus: EventBus,
}

impl Drop for BusHold {
    fn drop(&mut self) {
        let inner = &self.bus.inner;
        inner.holds.set(inner.holds.get().saturating_sub(1));
        if inner.holds.get() == 0 && !inner.dispatching.get() && !inner.queue.borrow().is_empty() {
            self.bus.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(offset: u32) -> Notification {
        Notification::ViewportScrolled { offset }
    }

    fn offsets(log: &Rc<RefCell<Vec<(u8, u32)>>>) -> Vec<(u8, u32)> {
        log.borrow().clone()
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [1u8, 2, 3] {
            let log = Rc::clone(&log);
            bus.subscribe(move |n| {
                if let Notification::ViewportScrolled { offset } = n {
                    log.borrow_mut().push((tag, *offset));
                }
            });
        }
        bus.emit(scroll(7));
        assert_eq!(offsets(&log), vec![(1, 7), (2, 7), (3, 7)]);
    }

    #[test]
    fn nested_emit_is_queued_until_dispatch_finishes() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let echo = bus.clone();
        let l = Rc::clone(&log);
        bus.subscribe(move |n| {
            if let Notification::ViewportScrolled { offset } = n {
                l.borrow_mut().push((1, *offset));
                if *offset == 1 {
                    echo.emit(scroll(2));
                }
            }
        });
        let l = Rc::clone(&log);
        bus.subscribe(move |n| {
            if let Notification::ViewportScrolled { offset } = n {
                l.borrow_mut().push((2, *offset));
            }
        });

        bus.emit(scroll(1));
        assert_eq!(offsets(&log), vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn hold_defers_delivery() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        bus.subscribe(move |n| {
            if let Notification::ViewportScrolled { offset } = n {
                l.borrow_mut().push((0, *offset));
            }
        });

        {
            let _outer = bus.hold();
            {
                let _inner = bus.hold();
                bus.emit(scroll(1));
            }
            bus.emit(scroll(2));
            assert!(log.borrow().is_empty());
        }
        assert_eq!(offsets(&log), vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = bus.subscribe(move |_| h.set(h.get() + 1));

        bus.emit(scroll(1));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(scroll(2));
        assert_eq!(hits.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn notification_json_carries_kebab_name() {
        let json = Notification::VisibilityChanged { hidden: true }.to_json();
        assert_eq!(json["event"], "visibility-change");
        assert_eq!(json["detail"]["hidden"], true);
    }
}
