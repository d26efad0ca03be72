//! Per-instance lifecycle: `Uninitialized → Initialized → Destroyed`.

use crate::mvi::{Intent, MachineState, Reducer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Destroyed,
}

impl MachineState for LifecycleState {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleIntent {
    /// Startup scan or an added notification matched the element.
    Init,
    /// A removed notification named the element.
    Destroy,
}

impl Intent for LifecycleIntent {}

pub struct LifecycleReducer;

impl Reducer for LifecycleReducer {
    type State = LifecycleState;
    type Intent = LifecycleIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match (state, intent) {
            (LifecycleState::Uninitialized, LifecycleIntent::Init) => LifecycleState::Initialized,
            (LifecycleState::Initialized, LifecycleIntent::Destroy) => LifecycleState::Destroyed,
            // Destroying something never initialised leaves nothing to tear down.
            (LifecycleState::Uninitialized, LifecycleIntent::Destroy) => LifecycleState::Uninitialized,
            (state, _) => state,
        }
    }
}
