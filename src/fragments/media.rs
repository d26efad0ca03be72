//! Playback state shared by the podcast card and the video player.

use tracing::error;

use crate::bus::MediaKind;
use crate::dom::ElementId;
use crate::lifecycle::FragmentContext;
use crate::mvi::{Intent, MachineState, Reducer};
use crate::platform::CapabilityError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Failed,
}

impl MachineState for PlayerState {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerIntent {
    Play,
    Started,
    Rejected,
    Pause,
}

impl Intent for PlayerIntent {}

pub struct PlayerReducer;

impl Reducer for PlayerReducer {
    type State = PlayerState;
    type Intent = PlayerIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        use PlayerIntent as I;
        use PlayerState as S;
        match (state, intent) {
            (S::Idle | S::Paused | S::Failed, I::Play) => S::Loading,
            (S::Loading, I::Started) => S::Playing,
            (S::Loading, I::Rejected) => S::Failed,
            (S::Loading | S::Playing, I::Pause) => S::Paused,
            (state, _) => state,
        }
    }
}

/// One native media element and its playback state.
pub(crate) struct Player {
    media: ElementId,
    kind: MediaKind,
    state: PlayerState,
}

impl Player {
    pub(crate) fn new(media: ElementId, kind: MediaKind) -> Self {
        Self {
            media,
            kind,
            state: PlayerState::Idle,
        }
    }

    pub(crate) fn media(&self) -> ElementId {
        self.media
    }

    pub(crate) fn kind(&self) -> MediaKind {
        self.kind
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    fn apply(&mut self, intent: PlayerIntent) {
        self.state = PlayerReducer::reduce(self.state, intent);
    }

    /// Ask the platform to start playback. A rejection leaves the player in
    /// `Failed` and is returned for the caller to surface.
    pub(crate) fn play(&mut self, ctx: &FragmentContext) -> Result<(), CapabilityError> {
        self.apply(PlayerIntent::Play);
        match ctx.platform.play_media(self.media) {
            Ok(()) => {
                self.apply(PlayerIntent::Started);
                Ok(())
            }
            Err(e) => {
                error!(media = %self.media, error = %e, "playback failed");
                self.apply(PlayerIntent::Rejected);
                Err(e)
            }
        }
    }

    /// Returns false if nothing was playing.
    pub(crate) fn pause(&mut self, ctx: &FragmentContext) -> bool {
        if !matches!(self.state, PlayerState::Playing | PlayerState::Loading) {
            return false;
        }
        ctx.platform.pause_media(self.media);
        self.apply(PlayerIntent::Pause);
        true
    }
}
