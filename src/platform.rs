//! Native browser capabilities: share, clipboard, notifications, media and
//! fullscreen.
//!
//! Each call returns the settled outcome of what would be a promise in a
//! browser. Callers treat [`CapabilityError::Unsupported`] as "take the
//! fallback path" and [`CapabilityError::Rejected`] as a recoverable failure.

use std::cell::{Cell, RefCell};
use std::fmt;

use thiserror::Error;

use crate::dom::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Share,
    Clipboard,
    Notifications,
    Media,
    Fullscreen,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Share => "share",
            Self::Clipboard => "clipboard",
            Self::Notifications => "notifications",
            Self::Media => "media playback",
            Self::Fullscreen => "fullscreen",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{0} is not supported")]
    Unsupported(Capability),

    #[error("{capability} was rejected: {reason}")]
    Rejected { capability: Capability, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

pub trait Platform {
    fn share(&self, title: &str, url: &str) -> Result<(), CapabilityError>;

    fn write_clipboard(&self, text: &str) -> Result<(), CapabilityError>;

    fn notification_permission(&self) -> Result<Permission, CapabilityError>;

    fn request_notification_permission(&self) -> Result<Permission, CapabilityError>;

    fn show_notification(&self, title: &str, body: &str) -> Result<(), CapabilityError>;

    fn play_media(&self, element: ElementId) -> Result<(), CapabilityError>;

    fn pause_media(&self, element: ElementId);

    /// `percent` is 0..=100.
    fn set_media_volume(&self, element: ElementId, percent: u8, muted: bool);

    fn seek_media(&self, element: ElementId, seconds: u32);

    /// Enter (`on`) or leave fullscreen with `element` as the fullscreen root.
    fn set_fullscreen(&self, element: ElementId, on: bool) -> Result<(), CapabilityError>;

    /// Scheme and host prepended to relative links when sharing.
    fn origin(&self) -> &str;
}

/// How a [`HeadlessPlatform`] answers calls to one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Support {
    #[default]
    Available,
    Missing,
    Rejects,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Share { title: String, url: String },
    Clipboard(String),
    PermissionRequest,
    Notification { title: String, body: String },
    Play(ElementId),
    Pause(ElementId),
    Volume { element: ElementId, percent: u8, muted: bool },
    Seek { element: ElementId, seconds: u32 },
    Fullscreen { element: ElementId, on: bool },
}

/// Scriptable platform with no browser behind it. Records every call.
#[derive(Debug)]
pub struct HeadlessPlatform {
    share: Support,
    clipboard: Support,
    notifications: Support,
    media: Support,
    fullscreen: Support,
    permission_answer: Permission,
    permission: Cell<Permission>,
    origin: String,
    calls: RefCell<Vec<PlatformCall>>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self {
            share: Support::Missing,
            clipboard: Support::Available,
            notifications: Support::Available,
            media: Support::Available,
            fullscreen: Support::Available,
            permission_answer: Permission::Granted,
            permission: Cell::new(Permission::Default),
            origin: "https://www.example.com".to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_share(mut self, support: Support) -> Self {
        self.share = support;
        self
    }

    pub fn with_clipboard(mut self, support: Support) -> Self {
        self.clipboard = support;
        self
    }

    pub fn with_notifications(mut self, support: Support) -> Self {
        self.notifications = support;
        self
    }

    pub fn with_media(mut self, support: Support) -> Self {
        self.media = support;
        self
    }

    pub fn with_fullscreen(mut self, support: Support) -> Self {
        self.fullscreen = support;
        self
    }

    /// What the user answers when asked for notification permission.
    pub fn with_permission_answer(mut self, answer: Permission) -> Self {
        self.permission_answer = answer;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.borrow_mut().push(call);
    }

    fn check(support: Support, capability: Capability) -> Result<(), CapabilityError> {
        match support {
            Support::Available => Ok(()),
            Support::Missing => Err(CapabilityError::Unsupported(capability)),
            Support::Rejects => Err(CapabilityError::Rejected {
                capability,
                reason: "NotAllowedError".to_string(),
            }),
        }
    }
}

impl Platform for HeadlessPlatform {
    fn share(&self, title: &str, url: &str) -> Result<(), CapabilityError> {
        if self.share == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Share));
        }
        self.record(PlatformCall::Share {
            title: title.to_string(),
            url: url.to_string(),
        });
        Self::check(self.share, Capability::Share)
    }

    fn write_clipboard(&self, text: &str) -> Result<(), CapabilityError> {
        if self.clipboard == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Clipboard));
        }
        self.record(PlatformCall::Clipboard(text.to_string()));
        Self::check(self.clipboard, Capability::Clipboard)
    }

    fn notification_permission(&self) -> Result<Permission, CapabilityError> {
        if self.notifications == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Notifications));
        }
        Ok(self.permission.get())
    }

    fn request_notification_permission(&self) -> Result<Permission, CapabilityError> {
        if self.notifications == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Notifications));
        }
        self.record(PlatformCall::PermissionRequest);
        Self::check(self.notifications, Capability::Notifications)?;
        if self.permission.get() == Permission::Default {
            self.permission.set(self.permission_answer);
        }
        Ok(self.permission.get())
    }

    fn show_notification(&self, title: &str, body: &str) -> Result<(), CapabilityError> {
        Self::check(self.notifications, Capability::Notifications)?;
        if self.permission.get() != Permission::Granted {
            return Err(CapabilityError::Rejected {
                capability: Capability::Notifications,
                reason: "permission not granted".to_string(),
            });
        }
        self.record(PlatformCall::Notification {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn play_media(&self, element: ElementId) -> Result<(), CapabilityError> {
        if self.media == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Media));
        }
        self.record(PlatformCall::Play(element));
        Self::check(self.media, Capability::Media)
    }

    fn pause_media(&self, element: ElementId) {
        if self.media != Support::Missing {
            self.record(PlatformCall::Pause(element));
        }
    }

    fn set_media_volume(&self, element: ElementId, percent: u8, muted: bool) {
        if self.media != Support::Missing {
            self.record(PlatformCall::Volume {
                element,
                percent: percent.min(100),
                muted,
            });
        }
    }

    fn seek_media(&self, element: ElementId, seconds: u32) {
        if self.media != Support::Missing {
            self.record(PlatformCall::Seek { element, seconds });
        }
    }

    fn set_fullscreen(&self, element: ElementId, on: bool) -> Result<(), CapabilityError> {
        if self.fullscreen == Support::Missing {
            return Err(CapabilityError::Unsupported(Capability::Fullscreen));
        }
        self.record(PlatformCall::Fullscreen { element, on });
        Self::check(self.fullscreen, Capability::Fullscreen)
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn missing_share_is_unsupported_and_unrecorded() {
        let platform = HeadlessPlatform::new();
        let err = platform.share("t", "u").unwrap_err();
        assert_eq!(err, CapabilityError::Unsupported(Capability::Share));
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn permission_request_settles_once() {
        let platform = HeadlessPlatform::new().with_permission_answer(Permission::Denied);
        assert_eq!(platform.notification_permission(), Ok(Permission::Default));
        assert_eq!(platform.request_notification_permission(), Ok(Permission::Denied));
        assert_eq!(platform.notification_permission(), Ok(Permission::Denied));
        assert!(platform.show_notification("x", "y").is_err());
    }

    #[test]
    fn rejecting_media_still_records_attempt() {
        let mut doc = Document::default();
        let audio = doc.create_element("audio");
        let platform = HeadlessPlatform::new().with_media(Support::Rejects);

        let err = platform.play_media(audio).unwrap_err();
        assert!(matches!(err, CapabilityError::Rejected { capability: Capability::Media, .. }));
        assert_eq!(platform.calls(), vec![PlatformCall::Play(audio)]);
    }

    #[test]
    fn volume_is_clamped_and_rejected_fullscreen_is_recorded() {
        let mut doc = Document::default();
        let video = doc.create_element("video");
        let platform = HeadlessPlatform::new().with_fullscreen(Support::Rejects);

        platform.set_media_volume(video, 250, false);
        let err = platform.set_fullscreen(video, true).unwrap_err();
        assert!(matches!(err, CapabilityError::Rejected { capability: Capability::Fullscreen, .. }));
        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::Volume { element: video, percent: 100, muted: false },
                PlatformCall::Fullscreen { element: video, on: true },
            ]
        );
    }
}
