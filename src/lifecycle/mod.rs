//! Fragment lifecycle protocol.
//!
//! A [`FragmentModule`] knows how to initialise one fragment type; the
//! [`FragmentRegistry`] discovers roots, starts at most one
//! [`FragmentInstance`] per root and tears it down when the root leaves the
//! document. Instances talk to each other only through the bus.

mod context;
mod kind;
mod registry;
mod resources;
mod state;

use thiserror::Error;

use crate::analytics::Properties;
use crate::dom::ElementId;

pub use context::FragmentContext;
pub use kind::FragmentType;
pub use registry::{FragmentRegistry, InitOutcome};
pub use resources::{InstanceResources, WeakResources};
pub use state::{LifecycleIntent, LifecycleReducer, LifecycleState};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("unknown fragment type '{0}'")]
    UnknownFragmentType(String),

    #[error("no module registered for {0}")]
    NoModule(FragmentType),

    #[error("{fragment_type}: no root element at {element}")]
    MissingElement {
        fragment_type: FragmentType,
        element: ElementId,
    },

    #[error("{fragment_type}: element {element} is not attached to the document")]
    Detached {
        fragment_type: FragmentType,
        element: ElementId,
    },
}

/// User input delivered to a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Click,
    Input { value: String },
    Submit,
    KeyDown { key: String },
    /// The target scrolled into view.
    Intersect,
}

pub trait FragmentModule {
    fn fragment_type(&self) -> FragmentType;

    /// Wire up the fragment rooted at `root`. Missing sub-elements disable
    /// the matching feature instead of failing.
    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance>;
}

pub trait FragmentInstance {
    fn root(&self) -> ElementId;

    /// Sub-features discovered during init, published with the ready
    /// notification.
    fn summary(&self) -> Properties;

    /// `target` is the element the user acted on, somewhere inside the root.
    fn handle(&mut self, target: ElementId, interaction: &Interaction);

    fn resources(&self) -> &InstanceResources;

    /// Work beyond releasing resources, e.g. pausing media.
    fn teardown(&mut self) {}
}
