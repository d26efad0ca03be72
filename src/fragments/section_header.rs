use std::cell::Cell;

use tracing::{error, warn};

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::platform::{CapabilityError, Permission};
use crate::util::RelativeTimeStyle;

use super::feedback::show_feedback;
use super::parts::Parts;
use super::share::share_link;

const KIND: FragmentType = FragmentType::SectionHeader;
const CATEGORY: &str = "section_header";

pub struct SectionHeaderModule;

impl FragmentModule for SectionHeaderModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(SectionHeader::new(root, ctx))
    }
}

struct SectionHeader {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    section: String,
    follow: Option<ElementId>,
    bookmark: Option<ElementId>,
    share: Option<ElementId>,
    notify: Option<ElementId>,
    following: Cell<bool>,
    bookmarked: Cell<bool>,
    notifying: Cell<bool>,
}

impl SectionHeader {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let section = parts
            .root_attr("data-section")
            .or_else(|| parts.text_of("title"))
            .unwrap_or_default();

        if let Some(updated) = parts.one("last-updated") {
            parts.render_time(updated, &ctx.utils, RelativeTimeStyle::Sentence, "Last updated: ");
        }

        Self {
            root,
            ctx: ctx.clone(),
            resources: ctx.resources(),
            section,
            follow: parts.one("follow"),
            bookmark: parts.one("bookmark"),
            share: parts.one("share"),
            notify: parts.one("notify"),
            following: Cell::new(false),
            bookmarked: Cell::new(false),
            notifying: Cell::new(false),
            parts,
        }
    }

    fn set_pressed(&self, button: ElementId, pressed: bool, text: &str) {
        let mut doc = self.ctx.document.borrow_mut();
        doc.set_attr(button, "aria-pressed", pressed.to_string());
        doc.toggle_class(button, "section-header__action--active", Some(pressed));
        let label = doc.query_within(button, &KIND.part_class("action-text"));
        doc.set_text(label.unwrap_or(button), text);
    }

    fn toggle_follow(&self, button: ElementId) {
        let following = !self.following.get();
        self.following.set(following);
        self.set_pressed(button, following, if following { "Following" } else { "Follow" });

        self.ctx.emit(Notification::SectionFollow {
            element: self.root,
            following,
            section: self.section.clone(),
        });
        let action = if following { "follow" } else { "unfollow" };
        self.ctx.track(
            TrackingEvent::new(action, CATEGORY, "header_action_follow").with_value(self.section.clone()),
        );
        let message = if following {
            format!("Following {}", self.section)
        } else {
            format!("Unfollowed {}", self.section)
        };
        show_feedback(&self.ctx, &self.resources, self.root, &message);
    }

    fn toggle_bookmark(&self, button: ElementId) {
        let saved = !self.bookmarked.get();
        self.bookmarked.set(saved);
        self.set_pressed(button, saved, if saved { "Bookmarked" } else { "Bookmark" });

        self.ctx.emit(Notification::ContentSaved {
            element: self.root,
            saved,
            title: self.section.clone(),
        });
        let action = if saved { "bookmark" } else { "unbookmark" };
        self.ctx.track(
            TrackingEvent::new(action, CATEGORY, "header_action_bookmark").with_value(self.section.clone()),
        );
    }

    fn toggle_notifications(&self, button: ElementId) {
        self.ctx.track(
            TrackingEvent::new("notification", CATEGORY, "header_action_notification")
                .with_value(self.section.clone()),
        );
        if self.notifying.get() {
            self.notifying.set(false);
            self.set_pressed(button, false, "Get Notifications");
            show_feedback(&self.ctx, &self.resources, self.root, "Notifications disabled");
            return;
        }

        let message = match self.ctx.platform.request_notification_permission() {
            Ok(Permission::Granted) => {
                self.notifying.set(true);
                self.set_pressed(button, true, "Notifications On");
                if let Err(e) = self.ctx.platform.show_notification(
                    &format!("{} Updates", self.section),
                    "You will now receive notifications for this section.",
                ) {
                    warn!(root = %self.root, error = %e, "confirmation notification not shown");
                }
                "Notifications enabled"
            }
            Ok(_) => "Notification permission denied",
            Err(e @ CapabilityError::Unsupported(_)) => {
                warn!(root = %self.root, error = %e, "notifications unavailable");
                "Notifications not supported in this browser"
            }
            Err(e) => {
                error!(root = %self.root, error = %e, "notification permission request failed");
                "Failed to enable notifications"
            }
        };
        show_feedback(&self.ctx, &self.resources, self.root, message);
    }

    fn track_breadcrumb(&self, link: ElementId) {
        let text = self.ctx.document.borrow().text(link).trim().to_lowercase();
        self.ctx.track(TrackingEvent::new(
            "click",
            "breadcrumb",
            format!("breadcrumb_{}", text.replace(' ', "_")),
        ));
    }
}

impl FragmentInstance for SectionHeader {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        let has_actions = [self.follow, self.bookmark, self.share, self.notify]
            .iter()
            .any(Option::is_some);
        Properties::new()
            .insert("section", self.section.clone())
            .insert("has_actions", has_actions)
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        if *interaction != Interaction::Click {
            return;
        }
        if let Some(button) = self.follow.filter(|b| self.parts.is_in(target, Some(*b))) {
            self.toggle_follow(button);
        } else if let Some(button) = self.bookmark.filter(|b| self.parts.is_in(target, Some(*b))) {
            self.toggle_bookmark(button);
        } else if let Some(button) = self.notify.filter(|b| self.parts.is_in(target, Some(*b))) {
            self.toggle_notifications(button);
        } else if self.parts.is_in(target, self.share) {
            let path = self.parts.root_attr("data-url").unwrap_or_default();
            share_link(&self.ctx, &self.resources, self.root, CATEGORY, &self.section, &path);
        } else if let Some(link) = self.parts.enclosing(target, "breadcrumb-link") {
            self.track_breadcrumb(link);
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }
}
