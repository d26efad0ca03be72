//! The fragment modules hosted on a page.
//!
//! Each module discovers its root by the fragment type slug and finds its
//! sub-elements by `<slug>__<part>` classes. A missing sub-element turns the
//! matching feature off.

mod carousel;
mod feedback;
mod footer;
mod header;
mod hero_banner;
mod live_content;
pub mod media;
mod navigation;
mod news_card;
mod parts;
mod podcast_card;
mod refresh;
mod search;
mod section_header;
mod share;
mod sidebar;
mod sticky;
mod video_player;

use crate::lifecycle::{FragmentModule, FragmentRegistry};

pub use carousel::CarouselModule;
pub use footer::FooterModule;
pub use header::HeaderModule;
pub use hero_banner::HeroBannerModule;
pub use live_content::LiveContentModule;
pub use navigation::NavigationModule;
pub use news_card::NewsCardModule;
pub use podcast_card::PodcastCardModule;
pub use section_header::SectionHeaderModule;
pub use sidebar::SidebarModule;
pub use video_player::VideoPlayerModule;

/// One module per fragment type.
pub fn all_modules() -> Vec<Box<dyn FragmentModule>> {
    vec![
        Box::new(HeaderModule),
        Box::new(NavigationModule),
        Box::new(HeroBannerModule),
        Box::new(NewsCardModule),
        Box::new(LiveContentModule),
        Box::new(PodcastCardModule),
        Box::new(VideoPlayerModule),
        Box::new(SidebarModule),
        Box::new(SectionHeaderModule),
        Box::new(FooterModule),
        Box::new(CarouselModule),
    ]
}

pub fn register_all(registry: &mut FragmentRegistry) {
    for module in all_modules() {
        registry.register(module);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::lifecycle::FragmentType;

    #[test]
    fn one_module_per_type() {
        let types: BTreeSet<FragmentType> = all_modules().iter().map(|m| m.fragment_type()).collect();
        assert_eq!(types.len(), FragmentType::ALL.len());
    }
}
