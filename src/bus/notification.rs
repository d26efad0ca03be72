use serde::Serialize;

use crate::analytics::{Properties, TrackingEvent};
use crate::dom::ElementId;
use crate::lifecycle::FragmentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// Summary a fragment publishes once it has finished initialising.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadySummary {
    pub fragment_type: FragmentType,
    pub element: ElementId,
    pub summary: Properties,
}

/// Every message that can travel on the bus.
///
/// The set is closed: fragments cannot invent new names, and each payload
/// has a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "detail", rename_all = "kebab-case")]
pub enum Notification {
    /// A fragment root was inserted after page load.
    FragmentAdded {
        fragment_type: FragmentType,
        element: ElementId,
    },
    /// A fragment root is leaving the document.
    FragmentRemoved {
        fragment_type: FragmentType,
        element: ElementId,
    },
    Ready(ReadySummary),
    SearchSuggestion {
        source: FragmentType,
        element: ElementId,
        query: String,
    },
    SearchSubmitted {
        source: FragmentType,
        query: String,
    },
    AnalyticsTrack(TrackingEvent),
    LiveContentRefresh {
        source: FragmentType,
        element: ElementId,
        url: Option<String>,
    },
    LiveContentUpdate {
        element: ElementId,
    },
    BreakpointChanged {
        element: ElementId,
        old: String,
        new: String,
    },
    ViewportResized {
        width: u32,
        height: u32,
    },
    ViewportScrolled {
        offset: u32,
    },
    VisibilityChanged {
        hidden: bool,
    },
    MediaPlay {
        element: ElementId,
        kind: MediaKind,
        title: String,
    },
    ContentSaved {
        element: ElementId,
        saved: bool,
        title: String,
    },
    SectionFollow {
        element: ElementId,
        following: bool,
        section: String,
    },
    NewsletterSignup {
        email: String,
    },
    /// Transient message shown to the user, e.g. after a rejected share.
    Feedback {
        element: ElementId,
        message: String,
    },
}

impl Notification {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FragmentAdded { .. } => "fragment-added",
            Self::FragmentRemoved { .. } => "fragment-removed",
            Self::Ready(summary) => summary.fragment_type.ready_event(),
            Self::SearchSuggestion { .. } => "search-suggestion",
            Self::SearchSubmitted { .. } => "search-submitted",
            Self::AnalyticsTrack(_) => "analytics-track",
            Self::LiveContentRefresh { .. } => "live-content-refresh",
            Self::LiveContentUpdate { .. } => "live-content-update",
            Self::BreakpointChanged { .. } => "breakpoint-change",
            Self::ViewportResized { .. } => "viewport-resize",
            Self::ViewportScrolled { .. } => "viewport-scroll",
            Self::VisibilityChanged { .. } => "visibility-change",
            Self::MediaPlay { .. } => "media-play",
            Self::ContentSaved { .. } => "content-save",
            Self::SectionFollow { .. } => "section-follow",
            Self::NewsletterSignup { .. } => "newsletter-signup",
            Self::Feedback { .. } => "feedback",
        }
    }

    /// JSON form with the event field set to [`Notification::name`].
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(object) = value.as_object_mut() {
            object.insert("event".to_string(), self.name().into());
        }
        value
    }
}
