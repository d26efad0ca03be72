use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::iter;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::bus::{ListenerId, Notification, ReadySummary};
use crate::dom::ElementId;
use crate::mvi::Reducer;

use super::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, Interaction, LifecycleError,
    LifecycleIntent, LifecycleReducer, LifecycleState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Initialized,
    /// The element already had a live instance; nothing was started.
    AlreadyInitialized,
}

struct InstanceRecord {
    fragment_type: FragmentType,
    state: LifecycleState,
    instance: Option<Box<dyn FragmentInstance>>,
}

/// Owns every fragment instance on a page, keyed by root element.
///
/// Fragment code only runs with the bus held, so a notification emitted by
/// an instance is never delivered while that instance is still running.
///
/// The record per element is what makes initialisation idempotent: the
/// startup scan and a later added notification for the same element start
/// only one instance.
pub struct FragmentRegistry {
    ctx: FragmentContext,
    modules: BTreeMap<FragmentType, Box<dyn FragmentModule>>,
    records: HashMap<ElementId, InstanceRecord>,
}

impl FragmentRegistry {
    pub fn new(ctx: FragmentContext) -> Self {
        Self {
            ctx,
            modules: BTreeMap::new(),
            records: HashMap::new(),
        }
    }

    /// Register a module, replacing any previous one for the same type.
    pub fn register(&mut self, module: Box<dyn FragmentModule>) {
        self.modules.insert(module.fragment_type(), module);
    }

    pub fn registered(&self) -> Vec<FragmentType> {
        self.modules.keys().copied().collect()
    }

    pub fn context(&self) -> &FragmentContext {
        &self.ctx
    }

    /// Subscribe the registry to added and removed notifications.
    pub fn listen(registry: &Rc<RefCell<Self>>) -> ListenerId {
        let weak = Rc::downgrade(registry);
        let bus = registry.borrow().ctx.bus.clone();
        bus.subscribe(move |notification| {
            if !matches!(
                notification,
                Notification::FragmentAdded { .. } | Notification::FragmentRemoved { .. }
            ) {
                return;
            }
            let Some(registry) = weak.upgrade() else {
                return;
            };
            match registry.try_borrow_mut() {
                Ok(mut registry) => registry.handle_notification(notification),
                Err(_) => warn!(
                    target: "lifecycle",
                    event = notification.name(),
                    "registry busy, notification dropped"
                ),
            };
        })
    }

    /// Initialise every matching element in the document. Returns the number
    /// of instances started.
    pub fn scan(&mut self) -> usize {
        let mut started = 0;
        for fragment_type in self.registered() {
            let roots = self.ctx.document.borrow().query_all(fragment_type.root_class());
            for root in roots {
                match self.init(fragment_type, root) {
                    Ok(InitOutcome::Initialized) => started += 1,
                    Ok(InitOutcome::AlreadyInitialized) => {}
                    Err(e) => warn!(target: "lifecycle", error = %e, "scan skipped element"),
                }
            }
        }
        debug!(target: "lifecycle", started, "startup scan finished");
        started
    }

    /// `element` is either the fragment root or a wrapper containing it.
    pub fn init(
        &mut self,
        fragment_type: FragmentType,
        element: ElementId,
    ) -> Result<InitOutcome, LifecycleError> {
        let Some(module) = self.modules.get(&fragment_type) else {
            return Err(LifecycleError::NoModule(fragment_type));
        };
        let _hold = self.ctx.bus.hold();
        let root = self.resolve_root(fragment_type, element)?;
        if !self.ctx.document.borrow().is_connected(root) {
            return Err(LifecycleError::Detached {
                fragment_type,
                element: root,
            });
        }

        let current = self
            .records
            .get(&root)
            .map(|record| record.state)
            .unwrap_or_default();
        if current == LifecycleState::Initialized {
            debug!(target: "lifecycle", %fragment_type, %root, "already initialized");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        let state = LifecycleReducer::reduce(LifecycleState::Uninitialized, LifecycleIntent::Init);
        let instance = module.init(root, &self.ctx);
        let summary = instance.summary();
        self.records.insert(
            root,
            InstanceRecord {
                fragment_type,
                state,
                instance: Some(instance),
            },
        );
        debug!(target: "lifecycle", %fragment_type, %root, "initialized");

        self.ctx.emit(Notification::Ready(ReadySummary {
            fragment_type,
            element: root,
            summary,
        }));
        Ok(InitOutcome::Initialized)
    }

    /// Returns false when there was no live instance to destroy.
    pub fn destroy(
        &mut self,
        fragment_type: FragmentType,
        element: ElementId,
    ) -> Result<bool, LifecycleError> {
        let root = self.resolve_root(fragment_type, element)?;
        let Some(record) = self.records.get(&root) else {
            return Ok(false);
        };
        if record.fragment_type != fragment_type {
            return Ok(false);
        }
        let next = LifecycleReducer::reduce(record.state, LifecycleIntent::Destroy);
        if next == record.state {
            return Ok(false);
        }

        // The record goes with the instance; a later init of the same element
        // starts from Uninitialized.
        let Some(record) = self.records.remove(&root) else {
            return Ok(false);
        };
        let _hold = self.ctx.bus.hold();
        if let Some(mut instance) = record.instance {
            instance.teardown();
            let released = instance.resources().release();
            debug!(target: "lifecycle", %fragment_type, %root, released, state = ?next, "destroyed");
        }
        Ok(true)
    }

    /// Tear down every live instance, e.g. when the page goes away.
    pub fn destroy_all(&mut self) -> usize {
        let live: Vec<(FragmentType, ElementId)> = self
            .records
            .iter()
            .filter(|(_, record)| record.state == LifecycleState::Initialized)
            .map(|(root, record)| (record.fragment_type, *root))
            .collect();
        let mut destroyed = 0;
        for (fragment_type, root) in live {
            if let Ok(true) = self.destroy(fragment_type, root) {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Deliver an interaction to the nearest initialised fragment enclosing
    /// `target`. Returns false if no instance owns it.
    pub fn route(&mut self, target: ElementId, interaction: &Interaction) -> bool {
        let _hold = self.ctx.bus.hold();
        let chain: Vec<ElementId> = {
            let doc = self.ctx.document.borrow();
            iter::once(target).chain(doc.ancestors(target)).collect()
        };
        for id in chain {
            if let Some(instance) = self
                .records
                .get_mut(&id)
                .and_then(|record| record.instance.as_mut())
            {
                instance.handle(target, interaction);
                return true;
            }
        }
        false
    }

    /// `Initialized` while `element` has a live instance. Destroyed instances
    /// leave no record behind, so their elements read as `Uninitialized`.
    pub fn state(&self, element: ElementId) -> LifecycleState {
        self.records
            .get(&element)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn live_count(&self) -> usize {
        self.records
            .values()
            .filter(|record| record.state == LifecycleState::Initialized)
            .count()
    }

    /// Number of elements the registry holds state for.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Roots of the live instances of one type, in element order.
    pub fn instances_of(&self, fragment_type: FragmentType) -> Vec<ElementId> {
        let mut roots: Vec<ElementId> = self
            .records
            .iter()
            .filter(|(_, record)| {
                record.fragment_type == fragment_type && record.state == LifecycleState::Initialized
            })
            .map(|(root, _)| *root)
            .collect();
        roots.sort();
        roots
    }

    pub fn handle_notification(&mut self, notification: &Notification) {
        match notification {
            Notification::FragmentAdded {
                fragment_type,
                element,
            } => {
                if !self.modules.contains_key(fragment_type) {
                    debug!(target: "lifecycle", %fragment_type, "no module for added fragment");
                    return;
                }
                if let Err(e) = self.init(*fragment_type, *element) {
                    warn!(target: "lifecycle", error = %e, "added fragment not initialized");
                }
            }
            Notification::FragmentRemoved {
                fragment_type,
                element,
            } => {
                if !self.modules.contains_key(fragment_type) {
                    return;
                }
                if let Err(e) = self.destroy(*fragment_type, *element) {
                    warn!(target: "lifecycle", error = %e, "removed fragment not destroyed");
                }
            }
            _ => {}
        }
    }

    fn resolve_root(
        &self,
        fragment_type: FragmentType,
        element: ElementId,
    ) -> Result<ElementId, LifecycleError> {
        let doc = self.ctx.document.borrow();
        let missing = LifecycleError::MissingElement {
            fragment_type,
            element,
        };
        if doc.element(element).is_none() {
            return Err(missing);
        }
        if doc.has_class(element, fragment_type.root_class()) {
            return Ok(element);
        }
        doc.query_within(element, fragment_type.root_class())
            .ok_or(missing)
    }
}
