use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};

use super::parts::Parts;
use super::search::SearchBox;
use super::sticky::hide_on_scroll;

const KIND: FragmentType = FragmentType::Header;

pub struct HeaderModule;

impl FragmentModule for HeaderModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(Header::new(root, ctx))
    }
}

struct Header {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    menu_toggle: Option<ElementId>,
    menu: Option<ElementId>,
    form: Option<ElementId>,
    search: Option<SearchBox>,
    sticky: bool,
}

impl Header {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let search = parts
            .one("search-input")
            .map(|input| SearchBox::new(ctx, &resources, KIND, input));
        let sticky = ctx.document.borrow().has_attr(root, "data-sticky-header");

        if sticky {
            hide_on_scroll(ctx, &resources, root, "header--hidden");
        }

        Self {
            root,
            ctx: ctx.clone(),
            menu_toggle: parts.one("menu-toggle"),
            menu: parts.one("menu"),
            form: parts.one("search-form"),
            search,
            sticky,
            parts,
            resources,
        }
    }

    fn toggle_menu(&self) {
        let (Some(toggle), Some(menu)) = (self.menu_toggle, self.menu) else {
            return;
        };
        let mut doc = self.ctx.document.borrow_mut();
        let open = doc.attr(toggle, "aria-expanded") != Some("true");
        doc.set_attr(toggle, "aria-expanded", open.to_string());
        doc.toggle_class(menu, "header__menu--open", Some(open));
    }

    fn submit(&self) {
        let Some(query) = self.search.as_ref().and_then(SearchBox::query) else {
            return;
        };
        if let Some(search) = &self.search {
            search.cancel();
        }
        self.ctx.emit(Notification::SearchSubmitted {
            source: KIND,
            query: query.clone(),
        });
        self.ctx
            .track(TrackingEvent::new("search", "header", "search_submit").with_value(query));
    }
}

impl FragmentInstance for Header {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("has_search", self.search.is_some())
            .insert("is_sticky", self.sticky)
            .insert("has_menu", self.menu.is_some())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        let on_input = self
            .search
            .as_ref()
            .is_some_and(|search| search.input() == target);
        match interaction {
            Interaction::Click if self.parts.is_in(target, self.menu_toggle) => self.toggle_menu(),
            Interaction::Input { value } if on_input => {
                if let Some(search) = &self.search {
                    search.on_input(value);
                }
            }
            Interaction::KeyDown { key } if on_input && key == "Escape" => {
                if let Some(search) = &self.search {
                    search.clear();
                }
            }
            Interaction::Submit if on_input || self.parts.is_in(target, self.form) => self.submit(),
            _ => {}
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }

    fn teardown(&mut self) {
        if let Some(search) = &self.search {
            search.cancel();
        }
    }
}
