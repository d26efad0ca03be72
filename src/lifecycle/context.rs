use std::rc::Rc;

use crate::analytics::{TrackingEvent, Tracker};
use crate::bus::{EventBus, Notification};
use crate::config::TimingConfig;
use crate::dom::SharedDocument;
use crate::platform::Platform;
use crate::scheduler::SharedScheduler;
use crate::util::Utils;

use super::InstanceResources;

/// Everything a fragment initialiser is handed. Cloning is cheap.
#[derive(Clone)]
pub struct FragmentContext {
    pub document: SharedDocument,
    pub bus: EventBus,
    pub scheduler: SharedScheduler,
    pub utils: Rc<Utils>,
    pub tracker: Tracker,
    pub platform: Rc<dyn Platform>,
    pub timing: TimingConfig,
}

impl FragmentContext {
    /// Fresh resource set for a new instance.
    pub fn resources(&self) -> InstanceResources {
        InstanceResources::new(self.scheduler.clone(), self.bus.clone())
    }

    pub fn emit(&self, notification: Notification) {
        self.bus.emit(notification);
    }

    pub fn track(&self, event: TrackingEvent) {
        self.tracker.report(event);
    }
}
