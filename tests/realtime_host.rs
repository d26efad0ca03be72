use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use fragment_host::analytics::LogSink;
use fragment_host::bus::Notification;
use fragment_host::config::HostConfig;
use fragment_host::dom::{ElementSpec, PageSpec};
use fragment_host::host::PageHost;
use fragment_host::platform::HeadlessPlatform;
use fragment_host::scheduler::{Scheduler, TokioScheduler};
use tokio::runtime::Handle;

#[tokio::test(start_paused = true)]
async fn live_refresh_runs_on_tokio_time() {
    let page = PageSpec {
        elements: vec![ElementSpec::new("article")
            .class("news-card")
            .child(ElementSpec::new("span").class("news-card__live"))],
        ..PageSpec::default()
    };
    let scheduler = Rc::new(TokioScheduler::new(Handle::current()));
    let host = PageHost::new(
        &HostConfig::default(),
        page.to_document().into_shared(),
        scheduler.clone(),
        Rc::new(HeadlessPlatform::new()),
        Rc::new(LogSink),
    )
    .expect("host");

    let refreshes = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&refreshes);
    host.bus().subscribe(move |n: &Notification| {
        if matches!(n, Notification::LiveContentRefresh { .. }) {
            *seen.borrow_mut() += 1;
        }
    });
    assert_eq!(host.start(), 1);

    scheduler.run_for(Duration::from_secs(65)).await;
    assert_eq!(*refreshes.borrow(), 2);

    drop(host);
    assert_eq!(scheduler.pending(), 0);
}
