//! State machines as pure folds: an intent and the current state go in, the
//! next state comes out. The lifecycle and the media player are written this
//! way so their transitions are testable without a document or a clock.

/// Something that can move a machine: a host notification such as "element
/// removed", or a user action such as "play".
pub trait Intent: 'static {}

/// A snapshot of one machine. `Default` is the state before any intent.
pub trait MachineState: Clone + PartialEq + Default + 'static {}

/// The transition table of one machine.
pub trait Reducer {
    type State: MachineState;
    type Intent: Intent;

    /// Next state for `intent`. Intents that do not apply return `state`
    /// unchanged.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;

    /// Apply `intents` in order, starting from `state`.
    fn fold(state: Self::State, intents: impl IntoIterator<Item = Self::Intent>) -> Self::State {
        intents.into_iter().fold(state, Self::reduce)
    }
}
