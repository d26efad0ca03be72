//! Analytics emission: every tracked interaction is forwarded to the sink
//! and broadcast as [`Notification::AnalyticsTrack`].

mod event;
mod properties;
mod sink;

use std::rc::Rc;

use thiserror::Error;
use tracing::warn;

use crate::bus::{EventBus, Notification};

pub use event::TrackingEvent;
pub use properties::Properties;
pub use sink::{AnalyticsSink, LogSink, RecordingSink};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("tracking event '{label}' has no action")]
    MissingAction { label: String },

    #[error("tracking event '{action}' has no category")]
    MissingCategory { action: String },
}

#[derive(Clone)]
pub struct Tracker {
    sink: Rc<dyn AnalyticsSink>,
    bus: EventBus,
    enabled: bool,
}

impl Tracker {
    pub fn new(sink: Rc<dyn AnalyticsSink>, bus: EventBus, enabled: bool) -> Self {
        Self { sink, bus, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Validate, forward to the sink, then broadcast.
    pub fn track(&self, event: TrackingEvent) -> Result<(), AnalyticsError> {
        event.validate()?;
        if !self.enabled {
            return Ok(());
        }
        self.sink.track(&event);
        self.bus.emit(Notification::AnalyticsTrack(event));
        Ok(())
    }

    /// Like [`Tracker::track`] for interaction handlers, which never fail.
    pub fn report(&self, event: TrackingEvent) {
        if let Err(e) = self.track(event) {
            warn!(target: "analytics", error = %e, "tracking event dropped");
        }
    }
}
