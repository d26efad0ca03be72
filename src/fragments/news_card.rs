use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::scheduler::TimerId;
use crate::util::{is_recent_label, BreakpointTable, Debounced, RelativeTimeStyle};

use super::parts::Parts;
use super::refresh::{load_lazy_image, start_live_refresh};

const KIND: FragmentType = FragmentType::NewsCard;

pub struct NewsCardModule;

impl FragmentModule for NewsCardModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(NewsCard::new(root, ctx))
    }
}

struct NewsCard {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    link: Option<ElementId>,
    image: Option<ElementId>,
    is_live: bool,
    layout: String,
    on_resize: Rc<Debounced<u32>>,
}

impl NewsCard {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let link = parts.one("link");
        let is_live = parts.one("live").is_some();
        let layout = parts
            .root_attr("data-layout")
            .unwrap_or_else(|| "vertical".to_string());

        if let Some(time) = parts.one("time") {
            start_label_refresh(ctx, &resources, &parts, time);
        }
        if is_live {
            let url = link.and_then(|link| parts.attr(link, "href"));
            start_live_refresh(ctx, &resources, KIND, root, url);
        }

        let on_resize = follow_device_breakpoint(ctx, &resources, root);

        Self {
            root,
            ctx: ctx.clone(),
            image: parts.one("image"),
            link,
            is_live,
            layout,
            on_resize,
            parts,
            resources,
        }
    }

    fn track_click(&self) {
        let headline = self.parts.text_of("headline").unwrap_or_default();
        let category = self.parts.text_of("category").unwrap_or_default();
        let url = self
            .link
            .and_then(|link| self.parts.attr(link, "href"))
            .unwrap_or_default();
        self.ctx.track(
            TrackingEvent::new("click", "news_card", "card_click")
                .with_value(headline.clone())
                .with_custom_data(
                    Properties::new()
                        .insert("headline", headline)
                        .insert("category", category)
                        .insert("url", url)
                        .insert("is_live", self.is_live),
                ),
        );
    }
}

/// Announce device-tier changes for this card once resizing settles.
fn follow_device_breakpoint(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    root: ElementId,
) -> Rc<Debounced<u32>> {
    let table = BreakpointTable::device();
    let width = ctx.document.borrow().viewport().width;
    let current = RefCell::new(table.resolve(width).to_string());

    let on_resize = {
        let ctx = ctx.clone();
        Rc::new(resources.debounce(ctx.timing.resize_debounce(), move |width: u32| {
            let new = table.resolve(width);
            if *current.borrow() == new {
                return;
            }
            let old = current.replace(new.to_string());
            ctx.emit(Notification::BreakpointChanged {
                element: root,
                old,
                new: new.to_string(),
            });
        }))
    };
    let trigger = Rc::clone(&on_resize);
    resources.subscribe(move |notification| {
        if let Notification::ViewportResized { width, .. } = notification {
            trigger.call(*width);
        }
    });
    on_resize
}

/// Format the card's timestamp and keep it fresh while the label is still
/// minute- or hour-granular. The interval stops itself once it is not.
fn start_label_refresh(ctx: &FragmentContext, resources: &InstanceResources, parts: &Parts, time: ElementId) {
    let Some(label) = parts.render_time(time, &ctx.utils, RelativeTimeStyle::Compact, "") else {
        return;
    };
    if !is_recent_label(&label) {
        return;
    }

    let own_id: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
    let slot = Rc::clone(&own_id);
    let utils = Rc::clone(&ctx.utils);
    let parts = parts.clone();
    let handle = resources.downgrade();
    let id = resources.set_interval(ctx.timing.label_refresh(), move || {
        let still_recent = parts
            .render_time(time, &utils, RelativeTimeStyle::Compact, "")
            .is_some_and(|label| is_recent_label(&label));
        if !still_recent {
            if let (Some(id), Some(resources)) = (slot.take(), handle.upgrade()) {
                resources.clear(id);
            }
        }
    });
    own_id.set(id);
}

impl FragmentInstance for NewsCard {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("has_image", self.image.is_some())
            .insert("is_live", self.is_live)
            .insert("layout", self.layout.clone())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        match interaction {
            Interaction::Click if self.parts.is_in(target, self.link) => self.track_click(),
            Interaction::KeyDown { key }
                if matches!(key.as_str(), "Enter" | " ") && self.parts.is_in(target, self.link) =>
            {
                self.track_click()
            }
            Interaction::Intersect if self.parts.is_in(target, self.image) => {
                if let Some(image) = self.image {
                    if load_lazy_image(&self.ctx.document, image, "news-card__image--loaded") {
                        self.ctx
                            .track(TrackingEvent::new("image_load", "news_card", "image_loaded"));
                    }
                }
            }
            _ => {}
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }

    fn teardown(&mut self) {
        self.on_resize.cancel();
    }
}
