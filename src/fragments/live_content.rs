use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::SecondsFormat;
use tracing::{debug, error, warn};

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::platform::{CapabilityError, Permission};
use crate::scheduler::TimerId;

use super::feedback::show_feedback;
use super::parts::Parts;

const KIND: FragmentType = FragmentType::LiveContent;
const CATEGORY: &str = "live_content";
const BASE_VIEWERS: u64 = 5000;
/// Upper bound for a page-supplied `data-refresh-interval`.
const MAX_REFRESH: Duration = Duration::from_secs(24 * 60 * 60);

const SAMPLE_UPDATES: [(&str, &str); 3] = [
    ("Just now", "New footage verified showing the aftermath of the overnight strikes."),
    ("2 mins ago", "Verification team confirms the location of damaged facilities."),
    ("5 mins ago", "Local authorities report emergency services at multiple locations."),
];

pub struct LiveContentModule;

impl FragmentModule for LiveContentModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(LiveContent::new(root, ctx))
    }
}

struct LiveContent {
    inner: Rc<LiveInner>,
}

struct LiveInner {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    updates: Option<ElementId>,
    viewers: Option<ElementId>,
    notify: Option<ElementId>,
    last_update: Option<ElementId>,
    period: Duration,
    refresh_timer: Cell<Option<TimerId>>,
    ticks: Cell<u64>,
    notifications_enabled: Cell<bool>,
    this: Weak<LiveInner>,
}

impl LiveContent {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let period = parts
            .root_attr("data-refresh-interval")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs).min(MAX_REFRESH))
            .unwrap_or_else(|| ctx.timing.live_refresh());

        let inner = Rc::new_cyclic(|this| LiveInner {
            root,
            ctx: ctx.clone(),
            updates: parts.one("updates"),
            viewers: parts.one("viewers"),
            notify: parts.one("notify"),
            last_update: parts.one("last-update"),
            parts,
            resources,
            period,
            refresh_timer: Cell::new(None),
            ticks: Cell::new(0),
            notifications_enabled: Cell::new(false),
            this: this.clone(),
        });

        if inner.notify.is_some() && ctx.platform.notification_permission() == Ok(Permission::Granted) {
            inner.set_notify_state(true);
        }

        inner.schedule_initial_load();
        inner.arm_refresh(period);
        inner.follow_visibility();
        Self { inner }
    }
}

impl LiveInner {
    fn weak(&self) -> Weak<LiveInner> {
        self.this.clone()
    }

    fn schedule_initial_load(&self) {
        let weak = self.weak();
        self.resources
            .set_timeout(self.ctx.timing.live_loading_delay(), move || {
                if let Some(inner) = weak.upgrade() {
                    inner.load_initial_updates();
                }
            });
    }

    fn load_initial_updates(&self) {
        let Some(container) = self.updates else {
            return;
        };
        let loading = self.parts.one("loading");
        {
            let mut doc = self.ctx.document.borrow_mut();
            if let Some(loading) = loading {
                doc.remove(loading);
            }
            for old in doc.query_all_within(container, &KIND.part_class("update")) {
                doc.remove(old);
            }
            for (time, text) in SAMPLE_UPDATES {
                let item = doc.create_element("div");
                doc.add_class(item, &KIND.part_class("update"));
                let stamp = doc.create_element("span");
                doc.add_class(stamp, &KIND.part_class("update-time"));
                doc.set_text(stamp, time);
                let body = doc.create_element("p");
                doc.add_class(body, &KIND.part_class("update-text"));
                doc.set_text(body, text);
                doc.append_child(item, stamp);
                doc.append_child(item, body);
                doc.append_child(container, item);
            }
        }
        self.touch_last_update();
    }

    /// (Re)start the refresh interval with a new period.
    fn arm_refresh(&self, period: Duration) {
        if let Some(id) = self.refresh_timer.take() {
            self.resources.clear(id);
        }
        let weak = self.weak();
        let id = self.resources.set_interval(period, move || {
            if let Some(inner) = weak.upgrade() {
                inner.refresh();
            }
        });
        self.refresh_timer.set(id);
        debug!(root = %self.root, period_secs = period.as_secs(), "live refresh armed");
    }

    fn follow_visibility(&self) {
        let weak = self.weak();
        self.resources.subscribe(move |notification| {
            let Notification::VisibilityChanged { hidden } = notification else {
                return;
            };
            if let Some(inner) = weak.upgrade() {
                let period = if *hidden {
                    inner.period.checked_mul(2).unwrap_or(inner.period)
                } else {
                    inner.period
                };
                inner.arm_refresh(period);
            }
        });
    }

    fn refresh(&self) {
        self.ctx
            .emit(Notification::LiveContentUpdate { element: self.root });
        let tick = self.ticks.get() + 1;
        self.ticks.set(tick);
        if let Some(viewers) = self.viewers {
            let count = BASE_VIEWERS + (tick * 137) % 1000;
            self.ctx
                .document
                .borrow_mut()
                .set_text(viewers, format!("{} watching", group_thousands(count)));
        }
        self.touch_last_update();
        self.ctx
            .track(TrackingEvent::new("live_update", CATEGORY, "auto_refresh"));
    }

    fn touch_last_update(&self) {
        let Some(element) = self.last_update else {
            return;
        };
        let now = self.ctx.utils.now();
        let mut doc = self.ctx.document.borrow_mut();
        doc.set_text(element, now.format("%H:%M").to_string());
        doc.set_attr(
            element,
            "datetime",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
    }

    fn set_notify_state(&self, enabled: bool) {
        self.notifications_enabled.set(enabled);
        let Some(button) = self.notify else {
            return;
        };
        let mut doc = self.ctx.document.borrow_mut();
        doc.toggle_class(button, "active", Some(enabled));
        let label = if enabled {
            "Disable notifications"
        } else {
            "Enable notifications"
        };
        doc.set_attr(button, "aria-label", label);
    }

    fn toggle_notifications(&self) {
        if self.notifications_enabled.get() {
            self.set_notify_state(false);
            self.ctx.track(TrackingEvent::new(
                "notification_disable",
                CATEGORY,
                "notifications_disabled",
            ));
            return;
        }

        match self.ctx.platform.request_notification_permission() {
            Ok(Permission::Granted) => {
                self.set_notify_state(true);
                if let Err(e) = self.ctx.platform.show_notification(
                    "Live Updates",
                    "You will now receive notifications for live updates.",
                ) {
                    warn!(root = %self.root, error = %e, "confirmation notification not shown");
                }
                self.ctx.track(TrackingEvent::new(
                    "notification_enable",
                    CATEGORY,
                    "notifications_enabled",
                ));
            }
            Ok(_) => warn!(root = %self.root, "notification permission denied"),
            Err(e @ CapabilityError::Unsupported(_)) => {
                warn!(root = %self.root, error = %e, "notifications unavailable")
            }
            Err(e) => {
                error!(root = %self.root, error = %e, "notification permission request failed");
                show_feedback(&self.ctx, &self.resources, self.root, "Unable to enable notifications");
            }
        }
    }

    fn track_link(&self, link: ElementId) {
        let is_title = self.parts.is_in(link, self.parts.one("title-link"));
        let label = if is_title { "title_click" } else { "link_click" };
        let viewers = self
            .viewers
            .map(|id| self.ctx.document.borrow().text(id).to_string())
            .unwrap_or_default();
        self.ctx.track(
            TrackingEvent::new("click", CATEGORY, label).with_custom_data(
                Properties::new()
                    .insert("viewers", viewers)
                    .insert("notifications", self.notifications_enabled.get()),
            ),
        );
    }
}

/// `5137` → `5,137`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl FragmentInstance for LiveContent {
    fn root(&self) -> ElementId {
        self.inner.root
    }

    fn summary(&self) -> Properties {
        let inner = &self.inner;
        Properties::new()
            .insert("refresh_interval", inner.period.as_secs())
            .insert(
                "notifications_supported",
                inner.ctx.platform.notification_permission().is_ok(),
            )
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        let inner = &self.inner;
        if *interaction != Interaction::Click {
            return;
        }
        if inner.parts.is_in(target, inner.notify) {
            inner.toggle_notifications();
        } else if let Some(link) = inner
            .parts
            .enclosing(target, "title-link")
            .or_else(|| inner.parts.enclosing(target, "link"))
        {
            inner.track_link(link);
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.inner.resources
    }
}
