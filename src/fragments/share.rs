use tracing::{debug, error, warn};

use crate::analytics::TrackingEvent;
use crate::dom::ElementId;
use crate::lifecycle::{FragmentContext, InstanceResources};
use crate::platform::CapabilityError;

use super::feedback::show_feedback;

/// Share through the native sheet, or copy the link when there is none.
pub(crate) fn share_link(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    root: ElementId,
    category: &str,
    title: &str,
    path: &str,
) {
    let url = absolute_url(ctx.platform.origin(), path);
    match ctx.platform.share(title, &url) {
        Ok(()) => ctx.track(TrackingEvent::new("share", category, "native_share").with_value(title)),
        Err(CapabilityError::Unsupported(_)) => copy_link(ctx, resources, root, category, title, &url),
        Err(e) => debug!(%root, error = %e, "share cancelled"),
    }
}

fn copy_link(
    ctx: &FragmentContext,
    resources: &InstanceResources,
    root: ElementId,
    category: &str,
    title: &str,
    url: &str,
) {
    match ctx.platform.write_clipboard(url) {
        Ok(()) => {
            show_feedback(ctx, resources, root, "Link copied to clipboard");
            ctx.track(TrackingEvent::new("share", category, "clipboard_share").with_value(title));
        }
        Err(e @ CapabilityError::Unsupported(_)) => {
            warn!(%root, error = %e, "no way to share");
            show_feedback(ctx, resources, root, "Sharing is not available");
        }
        Err(e) => {
            error!(%root, error = %e, "clipboard write failed");
            show_feedback(ctx, resources, root, "Unable to copy link");
        }
    }
}

pub(crate) fn absolute_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::absolute_url;

    #[test]
    fn relative_paths_get_origin() {
        assert_eq!(
            absolute_url("https://www.example.com/", "/sounds/ep-1"),
            "https://www.example.com/sounds/ep-1"
        );
        assert_eq!(absolute_url("https://a.test", ""), "https://a.test/");
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(absolute_url("https://a.test", "https://b.test/x"), "https://b.test/x");
    }
}
