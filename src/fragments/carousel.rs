use std::cell::Cell;

use crate::analytics::Properties;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};

use super::parts::Parts;

const KIND: FragmentType = FragmentType::Carousel;

pub struct CarouselModule;

impl FragmentModule for CarouselModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(Carousel::new(root, ctx))
    }
}

/// Image strip with one visible image, picked through its indicators.
struct Carousel {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    images: Vec<ElementId>,
    indicators: Vec<ElementId>,
    current: Cell<usize>,
}

impl Carousel {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let carousel = Self {
            root,
            ctx: ctx.clone(),
            resources: ctx.resources(),
            images: parts.all("image"),
            indicators: parts.all("indicator"),
            current: Cell::new(0),
            parts,
        };
        if !carousel.images.is_empty() {
            carousel.show(0);
        }
        carousel
    }

    /// Only image `index` stays visible; indicators mirror the choice.
    fn show(&self, index: usize) {
        self.current.set(index);
        let mut doc = self.ctx.document.borrow_mut();
        for (i, &image) in self.images.iter().enumerate() {
            let active = i == index;
            if active {
                doc.remove_attr(image, "hidden");
            } else {
                doc.set_attr(image, "hidden", "");
            }
            doc.toggle_class(image, "carousel__image--active", Some(active));
        }
        for (i, &indicator) in self.indicators.iter().enumerate() {
            let active = i == index;
            doc.toggle_class(indicator, "carousel__indicator--active", Some(active));
            doc.set_attr(indicator, "aria-selected", active.to_string());
        }
    }
}

impl FragmentInstance for Carousel {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("image_count", self.images.len())
            .insert("indicator_count", self.indicators.len())
            .insert("current", self.current.get())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        if *interaction != Interaction::Click {
            return;
        }
        let Some(indicator) = self.parts.enclosing(target, "indicator") else {
            return;
        };
        if let Some(index) = self.indicators.iter().position(|&i| i == indicator) {
            self.show(index);
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }
}
