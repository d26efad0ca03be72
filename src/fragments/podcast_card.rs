use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::analytics::{Properties, TrackingEvent};
use crate::bus::{MediaKind, Notification};
use crate::dom::ElementId;
use crate::lifecycle::{
    FragmentContext, FragmentInstance, FragmentModule, FragmentType, InstanceResources, Interaction,
};
use crate::util::{format_media_time, RelativeTimeStyle};

use super::feedback::show_feedback;
use super::media::Player;
use super::parts::Parts;
use super::share::share_link;

const KIND: FragmentType = FragmentType::PodcastCard;
const CATEGORY: &str = "podcast";

pub struct PodcastCardModule;

impl FragmentModule for PodcastCardModule {
    fn fragment_type(&self) -> FragmentType {
        KIND
    }

    fn init(&self, root: ElementId, ctx: &FragmentContext) -> Box<dyn FragmentInstance> {
        Box::new(PodcastCard::new(root, ctx))
    }
}

struct PodcastCard {
    root: ElementId,
    ctx: FragmentContext,
    resources: InstanceResources,
    parts: Parts,
    play_button: Option<ElementId>,
    save_button: Option<ElementId>,
    share_button: Option<ElementId>,
    player: Option<Rc<RefCell<Player>>>,
    saved: Cell<bool>,
}

impl PodcastCard {
    fn new(root: ElementId, ctx: &FragmentContext) -> Self {
        let resources = ctx.resources();
        let parts = Parts::new(ctx.document.clone(), root, KIND);
        let play_button = parts.one("play");

        if let Some(date) = parts.one("date") {
            parts.render_time(date, &ctx.utils, RelativeTimeStyle::Calendar, "");
        }

        let audio = parts.one("audio");
        if let (Some(audio), Some(total)) = (audio, parts.one("total-time")) {
            let seconds = parts
                .attr(audio, "data-duration")
                .and_then(|raw| raw.parse::<f64>().ok());
            if let Some(seconds) = seconds {
                ctx.document
                    .borrow_mut()
                    .set_text(total, format_media_time(seconds));
            }
        }

        let player = match (audio, play_button) {
            (Some(audio), Some(_)) => Some(Rc::new(RefCell::new(Player::new(audio, MediaKind::Audio)))),
            _ => None,
        };

        let card = Self {
            root,
            ctx: ctx.clone(),
            play_button,
            save_button: parts.one("save"),
            share_button: parts.one("share"),
            player,
            saved: Cell::new(false),
            parts,
            resources,
        };
        card.pause_when_others_play();
        card
    }

    /// Only one episode plays at a time across the page.
    fn pause_when_others_play(&self) {
        let Some(player) = &self.player else {
            return;
        };
        let player = Rc::clone(player);
        let ctx = self.ctx.clone();
        let root = self.root;
        let play_button = self.play_button;
        self.resources.subscribe(move |notification| {
            let Notification::MediaPlay { element, kind, .. } = notification else {
                return;
            };
            let mut player = player.borrow_mut();
            if *kind != player.kind() || *element == player.media() {
                return;
            }
            if player.pause(&ctx) {
                render_playing(&ctx, root, play_button, false);
            }
        });
    }

    fn title(&self) -> String {
        self.parts.text_of("episode-title").unwrap_or_default()
    }

    fn toggle_playback(&self) {
        let Some(player) = &self.player else {
            return;
        };
        let mut player = player.borrow_mut();
        let src = self
            .parts
            .attr(player.media(), "src")
            .unwrap_or_default();

        if player.is_playing() {
            player.pause(&self.ctx);
            render_playing(&self.ctx, self.root, self.play_button, false);
            self.ctx
                .track(TrackingEvent::new("pause", CATEGORY, "audio_pause").with_value(src));
            return;
        }

        match player.play(&self.ctx) {
            Ok(()) => {
                render_playing(&self.ctx, self.root, self.play_button, true);
                self.ctx
                    .track(TrackingEvent::new("play", CATEGORY, "audio_play").with_value(src));
                self.ctx.emit(Notification::MediaPlay {
                    element: player.media(),
                    kind: MediaKind::Audio,
                    title: self.title(),
                });
            }
            Err(_) => {
                render_playing(&self.ctx, self.root, self.play_button, false);
                show_feedback(
                    &self.ctx,
                    &self.resources,
                    self.root,
                    "Failed to load audio. Please try again.",
                );
            }
        }
    }

    fn toggle_saved(&self) {
        let saved = !self.saved.get();
        self.saved.set(saved);
        if let Some(button) = self.save_button {
            let mut doc = self.ctx.document.borrow_mut();
            doc.set_attr(button, "aria-pressed", saved.to_string());
            doc.toggle_class(button, "podcast-card__save--saved", Some(saved));
        }
        let title = self.title();
        self.ctx.track(
            TrackingEvent::new(if saved { "save" } else { "unsave" }, CATEGORY, "episode_save")
                .with_value(title.clone()),
        );
        self.ctx.emit(Notification::ContentSaved {
            element: self.root,
            saved,
            title,
        });
        let message = if saved {
            "Episode saved"
        } else {
            "Episode removed from saved"
        };
        show_feedback(&self.ctx, &self.resources, self.root, message);
    }

    fn share(&self) {
        let path = self
            .parts
            .one("episode-link")
            .and_then(|link| self.parts.attr(link, "href"))
            .unwrap_or_default();
        share_link(&self.ctx, &self.resources, self.root, CATEGORY, &self.title(), &path);
    }
}

fn render_playing(ctx: &FragmentContext, root: ElementId, button: Option<ElementId>, playing: bool) {
    let mut doc = ctx.document.borrow_mut();
    doc.toggle_class(root, "podcast-card--playing", Some(playing));
    if let Some(button) = button {
        doc.set_attr(button, "aria-pressed", playing.to_string());
        let label = if playing { "Pause episode" } else { "Play episode" };
        doc.set_attr(button, "aria-label", label);
    }
}

impl FragmentInstance for PodcastCard {
    fn root(&self) -> ElementId {
        self.root
    }

    fn summary(&self) -> Properties {
        Properties::new()
            .insert("has_audio", self.player.is_some())
            .insert("title", self.title())
    }

    fn handle(&mut self, target: ElementId, interaction: &Interaction) {
        if *interaction != Interaction::Click {
            return;
        }
        if self.parts.is_in(target, self.play_button) {
            self.toggle_playback();
        } else if self.parts.is_in(target, self.save_button) {
            self.toggle_saved();
        } else if self.parts.is_in(target, self.share_button) {
            self.share();
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
