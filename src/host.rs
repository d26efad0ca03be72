//! A page with its fragment runtime attached.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info};

use crate::analytics::{AnalyticsSink, Tracker};
use crate::bus::{EventBus, ListenerId, Notification};
use crate::config::HostConfig;
use crate::dom::{Document, ElementId, ElementSpec, SharedDocument, Viewport};
use crate::fragments;
use crate::lifecycle::{FragmentContext, FragmentRegistry, FragmentType, Interaction};
use crate::platform::Platform;
use crate::scheduler::SharedScheduler;
use crate::util::{BreakpointError, Debounced, Utils};

const BREAKPOINT_CLASS_PREFIX: &str = "breakpoint-";

#[derive(Error, Debug)]
pub enum HostError {
    #[error("invalid breakpoint table: {0}")]
    Breakpoints(#[from] BreakpointError),
}

/// Owns the registry and translates page events into bus notifications.
///
/// Everything runs on one thread. Dropping the host destroys every live
/// instance.
pub struct PageHost {
    ctx: FragmentContext,
    registry: Rc<RefCell<FragmentRegistry>>,
    registry_listener: ListenerId,
    breakpoint_class: Debounced<u32>,
}

impl PageHost {
    pub fn new(
        config: &HostConfig,
        document: SharedDocument,
        scheduler: SharedScheduler,
        platform: Rc<dyn Platform>,
        sink: Rc<dyn AnalyticsSink>,
    ) -> Result<Self, HostError> {
        let bus = EventBus::new();
        let utils = Rc::new(Utils::new(scheduler.clone(), config.breakpoints.table()?));
        let ctx = FragmentContext {
            document,
            bus: bus.clone(),
            scheduler,
            utils: utils.clone(),
            tracker: Tracker::new(sink, bus, config.analytics.enabled),
            platform,
            timing: config.timing.clone(),
        };

        let mut registry = FragmentRegistry::new(ctx.clone());
        fragments::register_all(&mut registry);
        let registry = Rc::new(RefCell::new(registry));
        let registry_listener = FragmentRegistry::listen(&registry);

        let document = ctx.document.clone();
        let class_utils = utils.clone();
        let breakpoint_class = utils.debounce(config.timing.resize_debounce(), move |width: u32| {
            apply_breakpoint_class(&mut document.borrow_mut(), &class_utils, width);
        });

        Ok(Self {
            ctx,
            registry,
            registry_listener,
            breakpoint_class,
        })
    }

    pub fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn document(&self) -> &SharedDocument {
        &self.ctx.document
    }

    pub fn context(&self) -> &FragmentContext {
        &self.ctx
    }

    pub fn registry(&self) -> Ref<'_, FragmentRegistry> {
        self.registry.borrow()
    }

    /// Startup scan plus the page-level breakpoint class. Returns the number
    /// of instances started.
    pub fn start(&self) -> usize {
        let _hold = self.ctx.bus.hold();
        let width = self.ctx.document.borrow().viewport().width;
        apply_breakpoint_class(&mut self.ctx.document.borrow_mut(), &self.ctx.utils, width);
        let started = self.registry.borrow_mut().scan();
        info!(started, width, "page host started");
        started
    }

    /// Insert `spec` under `parent` and announce it as a fragment of
    /// `fragment_type`.
    pub fn add_fragment(
        &self,
        fragment_type: FragmentType,
        parent: ElementId,
        spec: &ElementSpec,
    ) -> ElementId {
        let element = self.ctx.document.borrow_mut().build(parent, spec);
        self.ctx.emit(Notification::FragmentAdded {
            fragment_type,
            element,
        });
        element
    }

    /// Announce the removal, then detach the element.
    pub fn remove_fragment(&self, fragment_type: FragmentType, element: ElementId) -> bool {
        self.ctx.emit(Notification::FragmentRemoved {
            fragment_type,
            element,
        });
        self.ctx.document.borrow_mut().remove(element)
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.ctx
            .document
            .borrow_mut()
            .set_viewport(Viewport { width, height });
        self.ctx.emit(Notification::ViewportResized { width, height });
        self.breakpoint_class.call(width);
    }

    pub fn scroll(&self, offset: u32) {
        self.ctx.emit(Notification::ViewportScrolled { offset });
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.ctx.document.borrow_mut().set_hidden(hidden);
        self.ctx.emit(Notification::VisibilityChanged { hidden });
    }

    /// Deliver a user interaction. Input values land in the target's `value`
    /// attribute before the owning fragment sees them.
    pub fn interact(&self, target: ElementId, interaction: Interaction) -> bool {
        if let Interaction::Input { value } = &interaction {
            self.ctx
                .document
                .borrow_mut()
                .set_attr(target, "value", value.as_str());
        }
        let _hold = self.ctx.bus.hold();
        let routed = self.registry.borrow_mut().route(target, &interaction);
        if !routed {
            debug!(%target, "interaction outside any fragment");
        }
        routed
    }

    pub fn live_count(&self) -> usize {
        self.registry.borrow().live_count()
    }
}

impl Drop for PageHost {
    fn drop(&mut self) {
        self.breakpoint_class.cancel();
        let destroyed = {
            let _hold = self.ctx.bus.hold();
            let destroyed = self.registry.borrow_mut().destroy_all();
            destroyed
        };
        self.ctx.bus.unsubscribe(self.registry_listener);
        debug!(destroyed, "page host dropped");
    }
}

fn apply_breakpoint_class(doc: &mut Document, utils: &Utils, width: u32) {
    let body = doc.body();
    let class = format!("{BREAKPOINT_CLASS_PREFIX}{}", utils.breakpoint(width));
    if doc.has_class(body, &class) {
        return;
    }
    doc.remove_classes_with_prefix(body, BREAKPOINT_CLASS_PREFIX);
    doc.add_class(body, &class);
    debug!(%class, width, "body breakpoint class");
}
