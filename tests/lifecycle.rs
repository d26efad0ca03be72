mod common;

use common::{el, TestPage};
use fragment_host::bus::Notification;
use fragment_host::dom::ElementSpec;
use fragment_host::lifecycle::{
    FragmentRegistry, FragmentType, InitOutcome, LifecycleError, LifecycleState,
};

fn live_news_card() -> ElementSpec {
    el("article", "news-card")
        .child(el("a", "news-card__link").attr("href", "/news/1").text("Story"))
        .child(el("span", "news-card__live").text("LIVE"))
}

#[test]
fn startup_scan_initializes_each_fragment_once() {
    let page = TestPage::new(vec![
        live_news_card(),
        el("footer", "footer"),
        el("div", "weather-widget"),
    ]);
    assert_eq!(page.host.start(), 2);
    assert_eq!(page.host.live_count(), 2);
    assert_eq!(page.count("news-card-ready"), 1);
    assert_eq!(page.count("footer-ready"), 1);
}

#[test]
fn added_notification_after_scan_is_idempotent() {
    let page = TestPage::started(vec![live_news_card()]);
    let card = page.find("news-card");
    assert_eq!(page.pending_timers(), 1);

    page.host.bus().emit(Notification::FragmentAdded {
        fragment_type: FragmentType::NewsCard,
        element: card,
    });

    assert_eq!(page.count("news-card-ready"), 1);
    assert_eq!(page.pending_timers(), 1);
    assert_eq!(page.host.registry().state(card), LifecycleState::Initialized);
}

#[test]
fn destroy_releases_timers_and_listeners() {
    let page = TestPage::started(vec![
        live_news_card(),
        el("section", "live-content").child(el("div", "live-content__updates")),
        el("nav", "navigation-menu"),
    ]);
    let listeners_before = page.host.bus().listener_count();
    assert!(page.pending_timers() > 0);

    for (kind, class) in [
        (FragmentType::NewsCard, "news-card"),
        (FragmentType::LiveContent, "live-content"),
        (FragmentType::NavigationMenu, "navigation-menu"),
    ] {
        let element = page.find(class);
        assert!(page.host.remove_fragment(kind, element));
        assert_eq!(page.host.registry().state(element), LifecycleState::Uninitialized);
    }
    assert_eq!(page.host.registry().record_count(), 0);

    assert_eq!(page.pending_timers(), 0);
    assert_eq!(page.host.live_count(), 0);
    // news-card, live-content and navigation each subscribed one listener
    assert_eq!(page.host.bus().listener_count(), listeners_before - 3);

    // Nothing fires after destruction.
    page.take_notifications();
    page.advance_ms(120_000);
    assert!(page.take_notifications().is_empty());
}

#[test]
fn dynamically_added_fragment_is_started() {
    let page = TestPage::started(vec![]);
    let body = page.host.document().borrow().body();
    let card = page
        .host
        .add_fragment(FragmentType::NewsCard, body, &live_news_card());

    assert_eq!(page.host.registry().state(card), LifecycleState::Initialized);
    assert_eq!(page.count("news-card-ready"), 1);

    page.advance_ms(30_000);
    assert_eq!(page.count("live-content-refresh"), 1);
}

#[test]
fn wrapper_element_resolves_to_fragment_root() {
    let page = TestPage::started(vec![]);
    let body = page.host.document().borrow().body();
    let wrapper = page.host.add_fragment(
        FragmentType::Footer,
        body,
        &el("div", "slot").child(el("footer", "footer")),
    );
    let footer = page.find("footer");
    assert_ne!(wrapper, footer);
    assert_eq!(page.host.registry().state(footer), LifecycleState::Initialized);
}

#[test]
fn reinserted_element_gets_a_fresh_instance() {
    let page = TestPage::started(vec![live_news_card()]);
    let card = page.find("news-card");
    page.host.remove_fragment(FragmentType::NewsCard, card);
    assert_eq!(page.pending_timers(), 0);

    {
        let mut doc = page.host.document().borrow_mut();
        let body = doc.body();
        doc.append_child(body, card);
    }
    page.host.bus().emit(Notification::FragmentAdded {
        fragment_type: FragmentType::NewsCard,
        element: card,
    });

    assert_eq!(page.host.registry().state(card), LifecycleState::Initialized);
    assert_eq!(page.count("news-card-ready"), 2);
    assert_eq!(page.pending_timers(), 1);
}

#[test]
fn add_remove_churn_leaves_no_records() {
    let page = TestPage::started(vec![]);
    let body = page.host.document().borrow().body();
    for _ in 0..1_000 {
        let footer = page.host.add_fragment(
            FragmentType::Footer,
            body,
            &el("footer", "footer").child(el("a", "footer__link").text("Home")),
        );
        assert!(page.host.remove_fragment(FragmentType::Footer, footer));
    }

    assert_eq!(page.count("footer-ready"), 1_000);
    assert_eq!(page.host.live_count(), 0);
    assert_eq!(page.host.registry().record_count(), 0);
    assert_eq!(page.host.bus().listener_count(), 2);
}

#[test]
fn unregistered_type_is_a_no_op() {
    let page = TestPage::started(vec![live_news_card()]);
    let card = page.find("news-card");

    let mut bare = FragmentRegistry::new(page.host.context().clone());
    assert!(bare.registered().is_empty());
    bare.handle_notification(&Notification::FragmentAdded {
        fragment_type: FragmentType::NewsCard,
        element: card,
    });
    assert_eq!(bare.live_count(), 0);
    assert_eq!(
        bare.init(FragmentType::NewsCard, card),
        Err(LifecycleError::NoModule(FragmentType::NewsCard))
    );

    assert!("weather-widget".parse::<FragmentType>().is_err());
}

#[test]
fn missing_root_is_reported_not_started() {
    let page = TestPage::started(vec![el("div", "slot")]);
    let slot = page.find("slot");
    let mut registry = FragmentRegistry::new(page.host.context().clone());
    fragment_host::fragments::register_all(&mut registry);

    let err = registry.init(FragmentType::Header, slot).unwrap_err();
    assert!(matches!(err, LifecycleError::MissingElement { .. }));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn direct_init_reports_already_initialized() {
    let page = TestPage::started(vec![el("footer", "footer")]);
    let footer = page.find("footer");
    let mut registry = FragmentRegistry::new(page.host.context().clone());
    fragment_host::fragments::register_all(&mut registry);

    assert_eq!(
        registry.init(FragmentType::Footer, footer),
        Ok(InitOutcome::Initialized)
    );
    assert_eq!(
        registry.init(FragmentType::Footer, footer),
        Ok(InitOutcome::AlreadyInitialized)
    );
    assert_eq!(registry.instances_of(FragmentType::Footer), vec![footer]);
}

#[test]
fn dropping_the_host_destroys_everything() {
    let page = TestPage::started(vec![live_news_card(), el("aside", "sidebar-content")]);
    let scheduler = page.scheduler.clone();
    assert!(fragment_host::scheduler::Scheduler::pending(&*scheduler) > 0);
    drop(page);
    assert_eq!(fragment_host::scheduler::Scheduler::pending(&*scheduler), 0);
}
