use crate::bus::Notification;
use crate::dom::ElementId;
use crate::lifecycle::{FragmentContext, InstanceResources};

/// Show a transient message on `element` via `data-feedback` and broadcast it.
/// The attribute is cleared after `feedback_ms` unless a newer message
/// replaced it.
pub(crate) fn show_feedback(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    element: ElementId,
    message: &str,
) {
    ctx.document
        .borrow_mut()
        .set_attr(element, "data-feedback", message);
    ctx.emit(Notification::Feedback {
        element,
        message: message.to_string(),
    });

    let document = ctx.document.clone();
    let shown = message.to_string();
    resources.set_timeout(ctx.timing.feedback(), move || {
        let mut doc = document.borrow_mut();
        if doc.attr(element, "data-feedback") == Some(shown.as_str()) {
            doc.remove_attr(element, "data-feedback");
        }
    });
}
