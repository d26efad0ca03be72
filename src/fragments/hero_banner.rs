use std::rc::Rc;

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::util::{BreakpointTable, Debounced};

use super::parts::Parts;
use super::refresh::{load_lazy_image, start_live_refresh};

const KIND: FragmentType = FragmentType::HeroBanner;

pub struct HeroBannerModule;

impl FragmentModule for HeroBannerModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(HeroBanner::new(root, ctx))
    }
}

struct HeroBanner {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    link: Option<ElementId>,
    background: Option<ElementId>,
    has_video: bool,
    is_live: bool,
    layout: String,
    on_resize: Rc<Debounced<u32>>,
}

impl HeroBanner {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let link = parts.one("link");
        let is_live = parts.one("live").is_some();
        let layout = parts
            .root_attr("data-layout")
            .unwrap_or_else(|| "full-width".to_string());

        let table = BreakpointTable::device();
        let width = ctx.document.borrow().viewport().width;
        write_breakpoint(ctx, root, &table, width);

        let on_resize = {
            let ctx = ctx.clone();
            Rc::new(resources.debounce(ctx.timing.resize_debounce(), move |width: u32| {
                write_breakpoint(&ctx, root, &table, width);
            }))
        };
        let trigger = Rc::clone(&on_resize);
        resources.subscribe(move |notification| {
            if let Notification::ViewportResized { width, .. } = notification {
                trigger.call(*width);
            }
        });

        if is_live {
            let url = link.and_then(|link| parts.attr(link, "href"));
            start_live_refresh(ctx, &resources, KIND, root, url);
        }

        Self {
            root,
            ctx: ctx.clone(),
            link,
            background: parts.one("background"),
            has_video: parts.one("video").is_some(),
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
        self.ctx.track(
            TrackingEvent::new("click", "hero", "banner_click")
                .with_value(headline.clone())
                .with_custom_data(
                    Properties::new()
                        .insert("headline", headline)
                        .insert("category", category)
                        .insert("is_live", self.is_live),
                ),
        );
    }
}

fn write_breakpoint(ctx: &FragmentContext, root: ElementId, table: &BreakpointTable, width: u32) {
    ctx.document
        .borrow_mut()
        .set_attr(root, "data-breakpoint", table.resolve(width));
}

impl FragmentInstance for HeroBanner {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("has_video", self.has_video)
            .insert("is_live", self.is_live)
            .insert("layout", self.layout.clone())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        match interaction {
            Interaction::Click if self.parts.is_in(target, self.link) => self.track_click(),
            Interaction::Intersect if self.parts.is_in(target, self.background) => {
                if let Some(background) = self.background {
                    if load_lazy_image(&self.ctx.document, background, "hero-banner__background--loaded") {
                        self.ctx
                            .track(TrackingEvent::new("image_load", "hero", "background_image"));
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
