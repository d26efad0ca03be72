use std::cell::Cell;

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};

use super::parts::Parts;

const KIND: FragmentType = FragmentType::Footer;

pub struct FooterModule;

impl FragmentModule for FooterModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(Footer::new(root, ctx))
    }
}

struct Footer {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    newsletter: Option<ElementId>,
    seen: Cell<bool>,
}

impl Footer {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        Self {
            root,
            ctx: ctx.clone(),
            resources: ctx.resources(),
            newsletter: parts.one("newsletter"),
            seen: Cell::new(false),
            parts,
        }
    }

    fn track_link(&self, link: ElementId) {
        let section = self
            .parts
            .enclosing(link, "section")
            .and_then(|section| {
                let doc = self.ctx.document.borrow();
                let title = doc.query_within(section, &KIND.part_class("section-title"))?;
                let text = doc.text(title).trim().to_string();
                Some(text)
            })
            .unwrap_or_else(|| "unknown".to_string());
        let text = self.ctx.document.borrow().text(link).trim().to_string();
        self.ctx.track(TrackingEvent::new(
            "click",
            "footer",
            format!("{}_{}", section.to_lowercase(), text.to_lowercase()),
        ));
    }

    fn track_social(&self, link: ElementId) {
        let platform = self
            .parts
            .attr(link, "data-platform")
            .unwrap_or_else(|| "unknown".to_string());
        self.ctx
            .track(TrackingEvent::new("click", "social", platform.to_lowercase()));
    }

    fn submit_newsletter(&self) {
        let Some(input) = self.parts.one("email") else {
            return;
        };
        let email = self
            .parts
            .attr(input, "value")
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        if email.is_empty() {
            return;
        }
        self.ctx
            .track(TrackingEvent::new("submit", "newsletter", "footer_signup"));
        self.ctx.emit(Notification::NewsletterSignup { email });
        self.ctx.document.borrow_mut().set_attr(input, "value", "");
    }
}

impl FragmentInstance for Footer {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        let links = self.parts.all("link").len() + self.parts.all("social-link").len();
        Properties::new()
            .insert("link_count", links)
            .insert("has_newsletter", self.newsletter.is_some())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        match interaction {
            Interaction::Click => {
                if let Some(link) = self.parts.enclosing(target, "social-link") {
                    self.track_social(link);
                } else if let Some(link) = self.parts.enclosing(target, "link") {
                    self.track_link(link);
                }
            }
            Interaction::Submit if self.parts.is_in(target, self.newsletter) => self.submit_newsletter(),
            Interaction::Intersect if !self.seen.replace(true) => {
                self.ctx
                    .track(TrackingEvent::new("view", "footer", "footer_visible"));
            }
            _ => {}
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }
}
