//! Shared test utilities: page builders, a notification recorder and a
//! recording analytics sink wired to a virtual clock.

#![allow(dead_code, unused_imports)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use fragment_host::analytics::{RecordingSink, TrackingEvent};
use fragment_host::bus::Notification;
use fragment_host::config::HostConfig;
use fragment_host::dom::{Document, ElementId, ElementSpec, PageSpec, Viewport};
use fragment_host::host::PageHost;
use fragment_host::lifecycle::Interaction;
use fragment_host::platform::HeadlessPlatform;
use fragment_host::scheduler::{Scheduler, VirtualScheduler};

/// Fixed "now" for every test page.
pub fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
}

pub fn el(tag: &str, class: &str) -> ElementSpec {
    ElementSpec::new(tag).class(class)
}

pub struct TestPage {
    pub scheduler: Rc<VirtualScheduler>,
    pub platform: Rc<HeadlessPlatform>,
    pub sink: RecordingSink,
    pub notifications: Rc<RefCell<Vec<Notification>>>,
    pub host: PageHost,
}

impl TestPage {
    pub fn new(elements: Vec<ElementSpec>) -> Self {
        Self::with(HostConfig::default(), HeadlessPlatform::new(), elements)
    }

    pub fn with(config: HostConfig, platform: HeadlessPlatform, elements: Vec<ElementSpec>) -> Self {
        let page = PageSpec {
            viewport: Viewport {
                width: 1280,
                height: 800,
            },
            hidden: false,
            elements,
        };
        let scheduler = Rc::new(VirtualScheduler::new(origin()));
        let platform = Rc::new(platform);
        let sink = RecordingSink::new();
        let host = PageHost::new(
            &config,
            page.to_document().into_shared(),
            scheduler.clone(),
            platform.clone(),
            Rc::new(sink.clone()),
        )
        .expect("default config builds a host");

        let notifications = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&notifications);
        host.bus()
            .subscribe(move |n: &Notification| recorded.borrow_mut().push(n.clone()));

        Self {
            scheduler,
            platform,
            sink,
            notifications,
            host,
        }
    }

    /// Build and start in one go.
    pub fn started(elements: Vec<ElementSpec>) -> Self {
        let page = Self::new(elements);
        page.host.start();
        page
    }

    pub fn advance_ms(&self, ms: u64) -> usize {
        self.scheduler.advance(Duration::from_millis(ms))
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// First element carrying `class`.
    pub fn find(&self, class: &str) -> ElementId {
        self.find_all(class)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no element with class {class}"))
    }

    pub fn find_all(&self, class: &str) -> Vec<ElementId> {
        self.host.document().borrow().query_all(class)
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<String> {
        self.host
            .document()
            .borrow()
            .attr(id, name)
            .map(str::to_string)
    }

    pub fn text(&self, id: ElementId) -> String {
        self.host.document().borrow().text(id).to_string()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.host.document().borrow().has_class(id, class)
    }

    pub fn click(&self, class: &str) -> bool {
        self.host.interact(self.find(class), Interaction::Click)
    }

    pub fn type_into(&self, class: &str, value: &str) -> bool {
        self.host.interact(
            self.find(class),
            Interaction::Input {
                value: value.to_string(),
            },
        )
    }

    pub fn press(&self, class: &str, key: &str) -> bool {
        self.host.interact(
            self.find(class),
            Interaction::KeyDown {
                key: key.to_string(),
            },
        )
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.notifications.borrow().iter().map(Notification::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| **n == name).count()
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.borrow_mut())
    }

    /// Tracked events as `action/category/label`.
    pub fn tracked(&self) -> Vec<String> {
        self.sink
            .events()
            .iter()
            .map(|e| format!("{}/{}/{}", e.action, e.category, e.label))
            .collect()
    }

    pub fn last_event(&self) -> TrackingEvent {
        self.sink.events().pop().expect("an event was tracked")
    }
}
