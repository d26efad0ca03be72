use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::analytics::{Properties, TrackingEvent};
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};

use super::parts::Parts;

const KIND: FragmentType = FragmentType::SidebarContent;
const CATEGORY: &str = "sidebar";
const LOADING: &str = "sidebar-content--loading";
const PAGE_SIZE: usize = 3;

pub struct SidebarModule;

impl FragmentModule for SidebarModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(Sidebar::new(root, ctx))
    }
}

struct Sidebar {
    inner: Rc<SidebarInner>,
}

struct SidebarInner {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    content_type: String,
    items: Option<ElementId>,
    load_more: Option<ElementId>,
    weather: Option<ElementId>,
    loading: Cell<bool>,
    refreshes: Cell<u32>,
    this: Weak<SidebarInner>,
}

impl Sidebar {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let content_type = parts
            .root_attr("data-content-type")
            .filter(|kind| !kind.trim().is_empty())
            .unwrap_or_else(|| "most-read".to_string());

        let inner = Rc::new_cyclic(|this| SidebarInner {
            root,
            ctx: ctx.clone(),
            resources: ctx.resources(),
            content_type,
            items: parts.one("items"),
            load_more: parts.one("load-more"),
            weather: parts.one("weather"),
            parts,
            loading: Cell::new(false),
            refreshes: Cell::new(0),
            this: this.clone(),
        });

        let weak = Rc::downgrade(&inner);
        inner
            .resources
            .set_interval(ctx.timing.sidebar_refresh(), move || {
                if let Some(inner) = weak.upgrade() {
                    inner.refresh();
                }
            });
        if inner.weather.is_some() {
            let weak = Rc::downgrade(&inner);
            inner
                .resources
                .set_interval(ctx.timing.weather_refresh(), move || {
                    if let Some(inner) = weak.upgrade() {
                        if !inner.ctx.document.borrow().is_hidden() {
                            inner.update_weather(None);
                        }
                    }
                });
        }
        Self { inner }
    }
}

impl SidebarInner {
    fn item_count(&self) -> usize {
        self.parts.all("item").len()
    }

    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
        let mut doc = self.ctx.document.borrow_mut();
        doc.toggle_class(self.root, LOADING, Some(loading));
        if let Some(button) = self.load_more {
            doc.set_attr(button, "aria-busy", loading.to_string());
        }
    }

    /// Run `then` after the simulated fetch latency, with the loading state
    /// shown in between.
    fn fetch(&self, then: fn(&SidebarInner)) {
        self.set_loading(true);
        let weak = self.this.clone();
        self.resources
            .set_timeout(self.ctx.timing.simulated_fetch(), move || {
                if let Some(inner) = weak.upgrade() {
                    inner.set_loading(false);
                    then(&inner);
                }
            });
    }

    /// Periodic refresh; skipped while the page is hidden or a fetch is
    /// already running.
    fn refresh(&self) {
        if self.ctx.document.borrow().is_hidden() || self.loading.get() {
            return;
        }
        self.fetch(|inner| {
            let round = inner.refreshes.get() + 1;
            inner.refreshes.set(round);
            let stamp = inner.ctx.utils.now().to_rfc3339();
            {
                let mut doc = inner.ctx.document.borrow_mut();
                for item in doc.query_all_within(inner.root, &KIND.part_class("item")) {
                    doc.set_attr(item, "data-refreshed", stamp.as_str());
                }
            }
            inner.ctx.track(
                TrackingEvent::new(
                    "content_refresh",
                    CATEGORY,
                    format!("refresh_{}", inner.content_type),
                )
                .with_value(round),
            );
        });
    }

    fn load_more(&self) {
        if self.loading.get() || self.items.is_none() {
            return;
        }
        self.fetch(|inner| {
            let Some(container) = inner.items else {
                return;
            };
            let start = inner.item_count();
            {
                let mut doc = inner.ctx.document.borrow_mut();
                for n in start + 1..=start + PAGE_SIZE {
                    let item = doc.create_element("li");
                    doc.add_class(item, &KIND.part_class("item"));
                    let title = doc.create_element("a");
                    doc.add_class(title, &KIND.part_class("item-title"));
                    doc.set_attr(title, "href", format!("/news/{}-{}", inner.content_type, n));
                    doc.set_text(title, format!("{} story {}", display_name(&inner.content_type), n));
                    doc.append_child(item, title);
                    doc.append_child(container, item);
                }
            }
            inner.ctx.track(
                TrackingEvent::new("load_more", CATEGORY, format!("load_more_{}", inner.content_type))
                    .with_value(PAGE_SIZE),
            );
        });
    }

    /// A user-picked location, or `None` for a periodic update of the
    /// current one.
    fn update_weather(&self, location: Option<&str>) {
        debug!(root = %self.root, location = location.unwrap_or("current"), "weather update");
        let event = TrackingEvent::new("weather_update", CATEGORY, "weather_widget_update");
        self.ctx.track(match location {
            Some(location) => event.with_value(location),
            None => event,
        });
    }

    fn set_location(&self, button: ElementId, location: &str) {
        let location = location.trim();
        if location.is_empty() {
            return;
        }
        self.ctx.document.borrow_mut().set_text(button, location);
        self.update_weather(Some(location));
    }

    fn track_item(&self, item: ElementId) {
        let position = self
            .parts
            .all("item")
            .iter()
            .position(|id| *id == item)
            .map(|index| index + 1)
            .unwrap_or_default();
        let title = self
            .parts
            .attr(item, "data-title")
            .or_else(|| {
                let doc = self.ctx.document.borrow();
                let title = doc.query_within(item, &KIND.part_class("item-title"))?;
                let text = doc.text(title).trim().to_string();
                Some(text)
            })
            .unwrap_or_default();
        self.ctx.track(
            TrackingEvent::new("click", CATEGORY, format!("item_click_{}", self.content_type))
                .with_value(title.clone())
                .with_custom_data(
                    Properties::new()
                        .insert("title", title)
                        .insert("position", position),
                ),
        );
    }
}

/// `most-read` → `Most read`.
fn display_name(content_type: &str) -> String {
    let spaced = content_type.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl FragmentInstance for Sidebar {
    fn root(&self) -> ElementId {
        self.inner.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("content_type", self.inner.content_type.clone())
            .insert("item_count", self.inner.item_count())
            .insert("has_load_more", self.inner.load_more.is_some())
            .insert("has_weather", self.inner.weather.is_some())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        let inner = &self.inner;
        if let Interaction::Input { value } = interaction {
            if let Some(button) = inner.parts.enclosing(target, "weather-location") {
                inner.set_location(button, value);
            }
            return;
        }
        if *interaction != Interaction::Click {
            return;
        }
        if inner.parts.is_in(target, inner.load_more) {
            inner.load_more();
        } else if let Some(item) = inner.parts.enclosing(target, "item") {
            inner.track_item(item);
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.inner.resources
    }
}
