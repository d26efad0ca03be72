use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{error, warn};

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::{MediaKind, Notification};
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::platform::CapabilityError;
use crate::scheduler::TimerId;
use crate::util::{format_media_time, RelativeTimeStyle};

use super::feedback::show_feedback;
use super::media::Player;
use super::parts::Parts;
use super::share::share_link;

const KIND: FragmentType = FragmentType::VideoPlayer;
const CATEGORY: &str = "video";
const CONTROLS_HIDDEN: &str = "video-player__controls--hidden";
/// Arrow keys move the playhead by this many seconds.
const SEEK_STEP: u32 = 10;
/// Arrow keys move the volume by this many percent.
const VOLUME_STEP: u8 = 10;

pub struct VideoPlayerModule;

impl FragmentModule for VideoPlayerModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(VideoPlayer::new(root, ctx))
    }
}

struct VideoPlayer {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    play_button: Option<ElementId>,
    controls: Option<ElementId>,
    captions_button: Option<ElementId>,
    share_button: Option<ElementId>,
    volume_button: Option<ElementId>,
    fullscreen_button: Option<ElementId>,
    player: Option<Rc<RefCell<Player>>>,
    captions: Cell<bool>,
    hide_timer: Rc<Cell<Option<TimerId>>>,
    duration: Option<u32>,
    position: Cell<u32>,
    volume: Cell<u8>,
    muted: Cell<bool>,
    fullscreen: Cell<bool>,
}

impl VideoPlayer {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);

        if let Some(date) = parts.one("date") {
            parts.render_time(date, &ctx.utils, RelativeTimeStyle::Compact, "");
        }

        let video = parts.one("video");
        let seconds = video
            .and_then(|video| parts.attr(video, "data-duration"))
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0);
        if let (Some(seconds), Some(label)) = (seconds, parts.one("duration")) {
            ctx.document
                .borrow_mut()
                .set_text(label, format_media_time(seconds));
        }

        let player = video.map(|video| Rc::new(RefCell::new(Player::new(video, MediaKind::Video))));

        let player_ui = Self {
            root,
            ctx: ctx.clone(),
            play_button: parts.one("play"),
            controls: parts.one("controls"),
            captions_button: parts.one("captions"),
            share_button: parts.one("share"),
            volume_button: parts.one("volume"),
            fullscreen_button: parts.one("fullscreen"),
            player,
            captions: Cell::new(false),
            hide_timer: Rc::new(Cell::new(None)),
            duration: seconds.map(|seconds| seconds.round().min(f64::from(u32::MAX)) as u32),
            position: Cell::new(0),
            volume: Cell::new(100),
            muted: Cell::new(false),
            fullscreen: Cell::new(false),
            parts,
            resources,
        };
        player_ui.pause_when_others_play();
        player_ui
    }

    fn pause_when_others_play(&self) {
        let Some(player) = &self.player else {
            return;
        };
        let player = Rc::clone(player);
        let ctx = self.ctx.clone();
        let root = self.root;
        self.resources.subscribe(move |notification| {
            let Notification::MediaPlay { element, kind, .. } = notification else {
                return;
            };
            let mut player = player.borrow_mut();
            if *kind == player.kind() && *element != player.media() && player.pause(&ctx) {
                ctx.document
                    .borrow_mut()
                    .toggle_class(root, "video-player--playing", Some(false));
            }
        });
    }

    fn title(&self) -> String {
        self.parts.text_of("title").unwrap_or_default()
    }

    fn set_controls_visible(&self, visible: bool) {
        if let Some(controls) = self.controls {
            self.ctx
                .document
                .borrow_mut()
                .toggle_class(controls, CONTROLS_HIDDEN, Some(!visible));
        }
    }

    /// Show the controls and hide them again after a quiet period, while
    /// the video is playing.
    fn wake_controls(&self) {
        if let Some(id) = self.hide_timer.take() {
            self.resources.clear(id);
        }
        self.set_controls_visible(true);
        let playing = self
            .player
            .as_ref()
            .is_some_and(|player| player.borrow().is_playing());
        let Some(controls) = self.controls.filter(|_| playing) else {
            return;
        };
        let document = self.ctx.document.clone();
        let slot = Rc::clone(&self.hide_timer);
        let id = self
            .resources
            .set_timeout(self.ctx.timing.controls_hide(), move || {
                slot.set(None);
                document
                    .borrow_mut()
                    .toggle_class(controls, CONTROLS_HIDDEN, Some(true));
            });
        self.hide_timer.set(id);
    }

    fn toggle_playback(&self) {
        let Some(player) = &self.player else {
            return;
        };
        let outcome = {
            let mut player = player.borrow_mut();
            if player.is_playing() {
                player.pause(&self.ctx);
                None
            } else {
                Some(player.play(&self.ctx).map(|()| player.media()))
            }
        };

        match outcome {
            None => {
                self.render_playing(false);
                self.ctx
                    .track(TrackingEvent::new("pause", CATEGORY, "video_pause").with_value(self.title()));
            }
            Some(Ok(media)) => {
                self.render_playing(true);
                let title = self.title();
                self.ctx
                    .track(TrackingEvent::new("play", CATEGORY, "video_play").with_value(title.clone()));
                self.ctx.emit(Notification::MediaPlay {
                    element: media,
                    kind: MediaKind::Video,
                    title,
                });
            }
            Some(Err(_)) => {
                self.render_playing(false);
                show_feedback(
                    &self.ctx,
                    &self.resources,
                    self.root,
                    "Failed to load video. Please try again.",
                );
            }
        }
        self.wake_controls();
    }

    fn render_playing(&self, playing: bool) {
        let mut doc = self.ctx.document.borrow_mut();
        doc.toggle_class(self.root, "video-player--playing", Some(playing));
        if let Some(button) = self.play_button {
            doc.set_attr(button, "aria-pressed", playing.to_string());
        }
    }

    fn toggle_captions(&self) {
        let on = !self.captions.get();
        self.captions.set(on);
        {
            let mut doc = self.ctx.document.borrow_mut();
            doc.toggle_class(self.root, "video-player--captions", Some(on));
            if let Some(button) = self.captions_button {
                doc.set_attr(button, "aria-pressed", on.to_string());
            }
        }
        let label = if on { "captions_on" } else { "captions_off" };
        self.ctx
            .track(TrackingEvent::new("captions_toggle", CATEGORY, label));
    }

    fn media(&self) -> Option<ElementId> {
        self.player.as_ref().map(|player| player.borrow().media())
    }

    fn toggle_mute(&self) {
        self.muted.set(!self.muted.get());
        self.apply_volume();
    }

    /// Zero volume mutes; any other level lifts an existing mute.
    fn set_volume(&self, percent: u8) {
        let percent = percent.min(100);
        self.volume.set(percent);
        if percent == 0 {
            self.muted.set(true);
        } else if self.muted.get() {
            self.muted.set(false);
        }
        self.apply_volume();
    }

    fn apply_volume(&self) {
        let Some(media) = self.media() else {
            return;
        };
        let (volume, muted) = (self.volume.get(), self.muted.get());
        self.ctx.platform.set_media_volume(media, volume, muted);

        let fill = self.parts.one("volume-fill");
        let mut doc = self.ctx.document.borrow_mut();
        if let Some(button) = self.volume_button {
            doc.set_attr(button, "aria-pressed", muted.to_string());
            doc.toggle_class(button, "video-player__volume--muted", Some(muted));
        }
        if let Some(fill) = fill {
            let level = if muted { 0 } else { volume };
            doc.set_attr(fill, "data-level", level.to_string());
        }
    }

    /// Move the playhead, clamped to the known duration.
    fn seek_to(&self, seconds: u32) {
        let Some(media) = self.media() else {
            return;
        };
        let seconds = self.duration.map_or(seconds, |duration| seconds.min(duration));
        self.position.set(seconds);
        self.ctx.platform.seek_media(media, seconds);
        if let Some(current) = self.parts.one("current") {
            self.ctx
                .document
                .borrow_mut()
                .set_text(current, format_media_time(f64::from(seconds)));
        }
    }

    /// `percent` of the known duration; ignored while the duration is unknown.
    fn seek_to_percent(&self, percent: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        self.seek_to((f64::from(duration) * fraction).round() as u32);
    }

    fn toggle_fullscreen(&self) {
        let on = !self.fullscreen.get();
        let target = self.parts.one("container").unwrap_or(self.root);
        match self.ctx.platform.set_fullscreen(target, on) {
            Ok(()) => {
                self.fullscreen.set(on);
                self.ctx
                    .document
                    .borrow_mut()
                    .toggle_class(self.root, "video-player--fullscreen", Some(on));
            }
            Err(e @ CapabilityError::Unsupported(_)) => {
                warn!(root = %self.root, error = %e, "fullscreen unavailable")
            }
            Err(e) => error!(root = %self.root, error = %e, "fullscreen request failed"),
        }
    }

    /// Player shortcuts. Returns false for keys the player does not use.
    fn on_key(&self, key: &str) -> bool {
        if self.player.is_none() {
            return false;
        }
        match key {
            " " | "k" => self.toggle_playback(),
            "m" => self.toggle_mute(),
            "f" => self.toggle_fullscreen(),
            "c" if self.captions_button.is_some() => self.toggle_captions(),
            "ArrowLeft" => self.seek_to(self.position.get().saturating_sub(SEEK_STEP)),
            "ArrowRight" => self.seek_to(self.position.get().saturating_add(SEEK_STEP)),
            "ArrowUp" => self.set_volume(self.volume.get().saturating_add(VOLUME_STEP)),
            "ArrowDown" => self.set_volume(self.volume.get().saturating_sub(VOLUME_STEP)),
            _ => return false,
        }
        true
    }

    fn share(&self) {
        let path = self
            .parts
            .root_attr("data-url")
            .unwrap_or_default();
        share_link(&self.ctx, &self.resources, self.root, CATEGORY, &self.title(), &path);
    }

    fn on_click(&self, target: ElementId) {
        if self.parts.is_in(target, self.play_button) || self.parts.is_in(target, self.parts.one("video")) {
            self.toggle_playback();
        } else if self.parts.is_in(target, self.captions_button) {
            self.toggle_captions();
            self.wake_controls();
        } else if self.parts.is_in(target, self.volume_button) {
            self.toggle_mute();
            self.wake_controls();
        } else if self.parts.is_in(target, self.fullscreen_button) {
            self.toggle_fullscreen();
        } else if self.parts.is_in(target, self.share_button) {
            self.share();
        } else {
            self.wake_controls();
        }
    }
}

impl FragmentInstance for VideoPlayer {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("has_video", self.player.is_some())
            .insert("has_controls", self.controls.is_some())
            .insert("has_captions", self.captions_button.is_some())
            .insert("has_fullscreen", self.fullscreen_button.is_some())
            .insert("title", self.title())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        match interaction {
            Interaction::Click => self.on_click(target),
            Interaction::KeyDown { key } => {
                if self.on_key(key) {
                    self.wake_controls();
                }
            }
            Interaction::Input { value } => {
                let Ok(percent) = value.trim().parse::<f64>() else {
                    return;
                };
                if !percent.is_finite() {
                    return;
                }
                if self.parts.is_in(target, self.parts.one("volume-slider")) {
                    self.set_volume(percent.clamp(0.0, 100.0).round() as u8);
                } else if self.parts.is_in(target, self.parts.one("progress")) {
                    self.seek_to_percent(percent);
                }
            }
            _ => {}
        }
    }

    fn resources(&self) -> &InstanceResources {
        &self.resources
    }

    fn teardown(&mut self) {
        if let Some(player) = &self.player {
            player.borrow_mut().pause(&self.ctx);
        }
    }
}
