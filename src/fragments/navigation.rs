use std::cell::RefCell;
use std::rc::Rc;

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::util::{BreakpointTable, Debounced};

use super::parts::Parts;
use super::search::SearchBox;
use super::sticky::hide_on_scroll;

const KIND: FragmentType = FragmentType::NavigationMenu;
const MOBILE: &str = "mobile";
const SUBMENU_OPEN: &str = "navigation-menu__submenu--open";

pub struct NavigationModule;

impl FragmentModule for NavigationModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(Navigation::new(root, ctx))
    }
}

struct Navigation {
    inner: Rc<NavInner>,
    search: Option<SearchBox>,
    form: Option<ElementId>,
    on_resize: Rc<Debounced<u32>>,
}

struct NavInner {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    toggle: Option<ElementId>,
    menu: Option<ElementId>,
    dropdowns: Vec<Dropdown>,
    table: BreakpointTable,
    layout: RefCell<String>,
}

/// A dropdown toggle and the submenu it opens, found within one menu item.
#[derive(Debug, Clone, Copy)]
struct Dropdown {
    toggle: ElementId,
    submenu: ElementId,
}

impl NavInner {
    fn is_open(&self) -> bool {
        self.menu
            .is_some_and(|menu| self.ctx.document.borrow().has_class(menu, "navigation-menu__menu--open"))
    }

    fn set_open(&self, open: bool) {
        let Some(menu) = self.menu else {
            return;
        };
        let mut doc = self.ctx.document.borrow_mut();
        doc.toggle_class(menu, "navigation-menu__menu--open", Some(open));
        if let Some(toggle) = self.toggle {
            doc.set_attr(toggle, "aria-expanded", open.to_string());
        }
    }

    fn toggle_menu(&self) {
        if self.toggle.is_none() {
            return;
        }
        let open = !self.is_open();
        self.set_open(open);
        let action = if open { "open" } else { "close" };
        self.ctx
            .track(TrackingEvent::new(action, "navigation", "mobile_menu_toggle"));
    }

    /// Re-resolve the layout for a new width; closes the mobile menu when
    /// leaving the mobile layout.
    fn relayout(&self, width: u32) {
        let new = self.table.resolve(width).to_string();
        let old = self.layout.replace(new.clone());
        if old == new {
            return;
        }
        if old == MOBILE && self.is_open() {
            self.set_open(false);
        }
        self.ctx
            .document
            .borrow_mut()
            .set_attr(self.root, "data-layout", new.as_str());
        self.ctx.emit(Notification::BreakpointChanged {
            element: self.root,
            old,
            new,
        });
    }

    fn dropdown_open(&self, dropdown: &Dropdown) -> bool {
        self.ctx.document.borrow().has_class(dropdown.submenu, SUBMENU_OPEN)
    }

    fn set_dropdown(&self, dropdown: &Dropdown, open: bool) {
        let mut doc = self.ctx.document.borrow_mut();
        doc.toggle_class(dropdown.submenu, SUBMENU_OPEN, Some(open));
        doc.set_attr(dropdown.toggle, "aria-expanded", open.to_string());
    }

    /// Open `dropdown` alone, or close it.
    fn show_dropdown(&self, dropdown: &Dropdown, open: bool) {
        if open {
            for other in self.dropdowns.iter().filter(|d| d.toggle != dropdown.toggle) {
                self.set_dropdown(other, false);
            }
        }
        self.set_dropdown(dropdown, open);
    }

    fn toggle_dropdown(&self, dropdown: &Dropdown) {
        let open = !self.dropdown_open(dropdown);
        self.show_dropdown(dropdown, open);
        let text = self.ctx.document.borrow().text(dropdown.toggle).trim().to_string();
        let action = if open { "open" } else { "close" };
        self.ctx
            .track(TrackingEvent::new(action, "navigation", "dropdown_toggle").with_value(text));
    }

    fn close_dropdowns(&self) {
        for dropdown in &self.dropdowns {
            self.set_dropdown(dropdown, false);
        }
    }

    fn dropdown_for_toggle(&self, target: ElementId) -> Option<Dropdown> {
        let toggle = self.parts.enclosing(target, "dropdown-toggle")?;
        self.dropdowns.iter().find(|d| d.toggle == toggle).copied()
    }

    fn dropdown_for_submenu(&self, target: ElementId) -> Option<Dropdown> {
        let submenu = self.parts.enclosing(target, "submenu")?;
        self.dropdowns.iter().find(|d| d.submenu == submenu).copied()
    }

    /// Clicks outside every dropdown item close all dropdowns.
    fn close_dropdowns_unless_within(&self, target: ElementId) {
        let inside = self.parts.enclosing(target, "item").is_some_and(|item| {
            let doc = self.ctx.document.borrow();
            self.dropdowns.iter().any(|d| doc.contains(item, d.toggle))
        });
        if !inside {
            self.close_dropdowns();
        }
    }

    fn track_link(&self, link: ElementId) {
        let text = self.ctx.document.borrow().text(link).trim().to_lowercase();
        let href = self.parts.attr(link, "href").unwrap_or_default();
        self.ctx.track(
            TrackingEvent::new("click", "navigation", format!("main_nav_{}", text.replace(' ', "_")))
                .with_custom_data(Properties::new().insert("url", href)),
        );
    }
}

impl Navigation {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let table = BreakpointTable::navigation();
        let width = ctx.document.borrow().viewport().width;
        let layout = table.resolve(width).to_string();
        ctx.document
            .borrow_mut()
            .set_attr(root, "data-layout", layout.as_str());

        let search = parts
            .one("search-input")
            .map(|input| SearchBox::new(ctx, &resources, KIND, input));
        let form = parts.one("search-form");
        let dropdowns = find_dropdowns(&parts, ctx);
        let sticky = ctx.document.borrow().has_attr(root, "data-sticky");
        if sticky {
            hide_on_scroll(ctx, &resources, root, "navigation-menu--hidden");
        }

        let inner = Rc::new(NavInner {
            root,
            ctx: ctx.clone(),
            toggle: parts.one("toggle"),
            menu: parts.one("menu"),
            dropdowns,
            parts,
            table,
            layout: RefCell::new(layout),
            resources,
        });

        let weak = Rc::downgrade(&inner);
        let on_resize = Rc::new(inner.resources.debounce(
            ctx.timing.resize_debounce(),
            move |width: u32| {
                if let Some(inner) = weak.upgrade() {
                    inner.relayout(width);
                }
            },
        ));

        let nav = Self {
            inner,
            search,
            form,
            on_resize,
        };
        nav.listen_for_resize();
        nav
    }

    fn listen_for_resize(&self) {
        let trigger = Rc::clone(&self.on_resize);
        self.inner.resources.subscribe(move |notification| {
            if let Notification::ViewportResized { width, .. } = notification {
                trigger.call(*width);
            }
        });
    }

    fn submit(&self) {
        let Some(search) = &self.search else {
            return;
        };
        let Some(query) = search.query() else {
            return;
        };
        search.cancel();
        self.inner.ctx.emit(Notification::SearchSubmitted {
            source: KIND,
            query: query.clone(),
        });
        self.inner
            .ctx
            .track(TrackingEvent::new("search", "navigation", "search_submit").with_value(query));
    }
}

fn find_dropdowns(parts: &Parts, ctx: &FragmentContext) -> Vec<Dropdown> {
    let submenu_class = KIND.part_class("submenu");
    parts
        .all("dropdown-toggle")
        .into_iter()
        .filter_map(|toggle| {
            let item = parts.enclosing(toggle, "item")?;
            let submenu = ctx.document.borrow().query_within(item, &submenu_class)?;
            Some(Dropdown { toggle, submenu })
        })
        .collect()
}

impl FragmentInstance for Navigation {
    fn root(&self) -> ElementId {
        self.inner.root
    }

    fn summary(&self) -> Properties {
        let sticky = self
            .inner
            .ctx
            .document
            .borrow()
            .has_attr(self.inner.root, "data-sticky");
        Properties::new()
            .insert("has_search", self.search.is_some())
            .insert("is_sticky", sticky)
            .insert("layout", self.inner.layout.borrow().clone())
            .insert("dropdown_count", self.inner.dropdowns.len())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        let inner = &self.inner;
        let on_input = self
            .search
            .as_ref()
            .is_some_and(|search| search.input() == target);
        match interaction {
            Interaction::Click if inner.parts.is_in(target, inner.toggle) => inner.toggle_menu(),
            Interaction::Click => {
                if let Some(dropdown) = inner.dropdown_for_toggle(target) {
                    inner.toggle_dropdown(&dropdown);
                    return;
                }
                inner.close_dropdowns_unless_within(target);
                if let Some(link) = inner.parts.enclosing(target, "link") {
                    inner.track_link(link);
                }
            }
            Interaction::Input { value } if on_input => {
                if let Some(search) = &self.search {
                    search.on_input(value);
                }
            }
            Interaction::KeyDown { key } if key == "Escape" => {
                if on_input {
                    if let Some(search) = &self.search {
                        search.clear();
                    }
                    return;
                }
                inner.close_dropdowns();
                if inner.is_open() {
                    inner.set_open(false);
                }
            }
            Interaction::KeyDown { key } if key == "ArrowDown" => {
                if let Some(dropdown) = inner.dropdown_for_toggle(target) {
                    inner.show_dropdown(&dropdown, true);
                }
            }
            Interaction::KeyDown { key } if key == "ArrowUp" => {
                if let Some(dropdown) = inner.dropdown_for_submenu(target) {
                    inner.show_dropdown(&dropdown, false);
                }
            }
            Interaction::Submit if on_input || inner.parts.is_in(target, self.form) => self.submit(),
            _ => {}
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.inner.resources
    }

    fn teardown(&mut self) {
        self.on_resize.cancel();
        if let Some(search) = &self.search {
            search.cancel();
        }
    }
}
