//! Behaviour shared by the news card and the hero banner.

use tracing::debug;

use crate::bus::Notification;
use crate::dom::{ElementId, SharedDocument};
use crate::lifecycle::{FragmentContext, FragmentType, InstanceResources};
use crate::scheduler::TimerId;

/// Periodically ask for fresh live content for this fragment.
pub(crate) fn start_live_refresh(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    source: FragmentType,
    root: ElementId,
    url: Option<String>,
) -> Option<TimerId> {
    let bus = ctx.bus.clone();
    resources.set_interval(ctx.timing.live_refresh(), move || {
        bus.emit(Notification::LiveContentRefresh {
            source,
            element: root,
            url: url.clone(),
        });
    })
}

/// Move `data-src` into `src`. Returns false if there was nothing to load.
pub(crate) fn load_lazy_image(document: &SharedDocument, image: ElementId, loaded_class: &str) -> bool {
    let mut doc = document.borrow_mut();
    let Some(src) = doc.remove_attr(image, "data-src") else {
        return false;
    };
    debug!(%image, %src, "lazy image loaded");
    doc.set_attr(image, "src", src);
    doc.add_class(image, loaded_class);
    true
}
