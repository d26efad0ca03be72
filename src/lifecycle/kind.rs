use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LifecycleError;

/// The fragment types a page can host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentType {
    Header,
    NavigationMenu,
    HeroBanner,
    NewsCard,
    LiveContent,
    PodcastCard,
    VideoPlayer,
    SidebarContent,
    SectionHeader,
    Footer,
    Carousel,
}

impl FragmentType {
    pub const ALL: [FragmentType; 11] = [
        Self::Header,
        Self::NavigationMenu,
        Self::HeroBanner,
        Self::NewsCard,
        Self::LiveContent,
        Self::PodcastCard,
        Self::VideoPlayer,
        Self::SidebarContent,
        Self::SectionHeader,
        Self::Footer,
        Self::Carousel,
    ];

    /// Kebab-case name, also used as the root element class.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::NavigationMenu => "navigation-menu",
            Self::HeroBanner => "hero-banner",
            Self::NewsCard => "news-card",
            Self::LiveContent => "live-content",
            Self::PodcastCard => "podcast-card",
            Self::VideoPlayer => "video-player",
            Self::SidebarContent => "sidebar-content",
            Self::SectionHeader => "section-header",
            Self::Footer => "footer",
            Self::Carousel => "carousel",
        }
    }

    pub fn root_class(self) -> &'static str {
        self.slug()
    }

    /// BEM class of a sub-element, e.g. `news-card__time`.
    pub fn part_class(self, part: &str) -> String {
        format!("{}__{}", self.slug(), part)
    }

    /// Name of the notification emitted after initialisation.
    pub fn ready_event(self) -> &'static str {
        match self {
            Self::Header => "header-ready",
            Self::NavigationMenu => "navigation-menu-ready",
            Self::HeroBanner => "hero-banner-ready",
            Self::NewsCard => "news-card-ready",
            Self::LiveContent => "live-content-ready",
            Self::PodcastCard => "podcast-card-ready",
            Self::VideoPlayer => "video-player-ready",
            Self::SidebarContent => "sidebar-content-ready",
            Self::SectionHeader => "section-header-ready",
            Self::Footer => "footer-ready",
            Self::Carousel => "carousel-ready",
        }
    }
}

impl FromStr for FragmentType {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| LifecycleError::UnknownFragmentType(s.to_string()))
    }
}

impl fmt::Display for FragmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_round_trips_for_every_type() {
        for kind in FragmentType::ALL {
            assert_eq!(kind.slug().parse::<FragmentType>().unwrap(), kind);
            assert!(kind.ready_event().starts_with(kind.slug()));
        }
    }

    #[test]
    fn unknown_slug_rejected() {
        assert!(matches!(
            "weather-widget".parse::<FragmentType>(),
            Err(LifecycleError::UnknownFragmentType(name)) if name == "weather-widget"
        ));
    }

    #[test]
    fn part_class_is_bem() {
        assert_eq!(FragmentType::NewsCard.part_class("time"), "news-card__time");
    }
}
