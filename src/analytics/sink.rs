use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::TrackingEvent;

/// The analytics collaborator. Delivery is fire-and-forget.
pub trait AnalyticsSink {
    fn track(&self, event: &TrackingEvent);
}

/// Writes every event to the `analytics` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn track(&self, event: &TrackingEvent) {
        info!(
            target: "analytics",
            action = %event.action,
            category = %event.category,
            label = %event.label,
            value = ?event.value,
            custom_data = ?event.custom_data,
            "track"
        );
    }
}

/// Keeps events in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TrackingEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AnalyticsSink for RecordingSink {
    fn track(&self, event: &TrackingEvent) {
        self.events.lock().push(event.clone());
    }
}
