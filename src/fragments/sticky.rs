//! Hide-on-scroll for sticky page chrome.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{FragmentContext, InstanceResources};

const SCROLL_THROTTLE: Duration = Duration::from_millis(100);
/// Offset below which sticky chrome always shows.
const SCROLL_THRESHOLD: u32 = 100;

/// Toggle `hidden_class` on `root`: set while scrolling down past the
/// threshold, cleared on the way up or near the top.
pub(crate) fn hide_on_scroll(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    root: ElementId,
    hidden_class: &'static str,
) {
    let document = ctx.document.clone();
    let last = Rc::new(Cell::new(0u32));
    let on_scroll = resources.throttle(SCROLL_THROTTLE, move |offset: u32| {
        let hidden = offset > SCROLL_THRESHOLD && offset > last.get();
        document
            .borrow_mut()
            .toggle_class(root, hidden_class, Some(hidden));
        last.set(offset);
    });
    resources.subscribe(move |notification| {
        if let Notification::ViewportScrolled { offset } = notification {
            on_scroll.call(*offset);
        }
    });
}
