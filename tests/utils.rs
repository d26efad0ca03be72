use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{TimeDelta, TimeZone, Utc};
use fragment_host::scheduler::{Scheduler, SharedScheduler, VirtualScheduler};
use fragment_host::util::{
    format_media_time, format_relative_time, parse_timestamp, BreakpointTable, RelativeTimeStyle,
    Tier, Utils,
};

fn utils() -> (Rc<VirtualScheduler>, Utils) {
    let scheduler = Rc::new(VirtualScheduler::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let shared: SharedScheduler = scheduler.clone();
    (scheduler, Utils::new(shared, BreakpointTable::grid()))
}

#[test]
fn debounce_runs_once_with_last_arguments() {
    let (scheduler, utils) = utils();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let debounced = utils.debounce(Duration::from_millis(300), move |n: u32| seen.borrow_mut().push(n));

    debounced.call(1);
    scheduler.advance(Duration::from_millis(100));
    debounced.call(2);
    scheduler.advance(Duration::from_millis(100));
    debounced.call(3);
    scheduler.advance(Duration::from_millis(299));
    assert!(calls.borrow().is_empty());
    assert!(debounced.is_pending());

    scheduler.advance(Duration::from_millis(1));
    assert_eq!(*calls.borrow(), vec![3]);
    assert!(!debounced.is_pending());
}

#[test]
fn dropping_a_debounce_cancels_it() {
    let (scheduler, utils) = utils();
    let calls = Rc::new(RefCell::new(0));
    let seen = Rc::clone(&calls);
    let debounced = utils.debounce(Duration::from_millis(50), move |()| *seen.borrow_mut() += 1);
    debounced.call(());
    drop(debounced);
    assert_eq!(scheduler.pending(), 0);
    scheduler.advance(Duration::from_secs(1));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn throttle_passes_leading_call_per_window() {
    let (scheduler, utils) = utils();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let throttled = utils.throttle(Duration::from_millis(100), move |n: u32| seen.borrow_mut().push(n));

    assert!(throttled.call(1));
    assert!(!throttled.call(2));
    scheduler.advance(Duration::from_millis(50));
    assert!(!throttled.call(3));
    scheduler.advance(Duration::from_millis(50));
    assert!(throttled.call(4));

    assert_eq!(*calls.borrow(), vec![1, 4]);
}

#[test]
fn grid_breakpoints() {
    let (_, utils) = utils();
    assert_eq!(utils.breakpoint(1920), "xl");
    assert_eq!(utils.breakpoint(1200), "xl");
    assert_eq!(utils.breakpoint(1199), "lg");
    assert_eq!(utils.breakpoint(991), "md");
    assert_eq!(utils.breakpoint(768), "md");
    assert_eq!(utils.breakpoint(767), "sm");
    assert_eq!(utils.breakpoint(575), "xs");
    assert_eq!(utils.breakpoint(0), "xs");
}

#[test]
fn device_and_navigation_tables_differ() {
    assert_eq!(BreakpointTable::device().resolve(1024), "desktop");
    assert_eq!(BreakpointTable::navigation().resolve(1024), "tablet");
    assert_eq!(BreakpointTable::navigation().resolve(768), "mobile");
}

#[test]
fn custom_table_must_have_a_floor() {
    assert!(BreakpointTable::new("t", vec![Tier::new(500, "big")]).is_err());
    assert!(BreakpointTable::new("t", vec![]).is_err());
    let table = BreakpointTable::new("t", vec![Tier::new(500, "big"), Tier::new(0, "small")])
        .expect("valid table");
    assert_eq!(table.resolve(499), "small");
}

#[test]
fn relative_time_against_scheduler_clock() {
    let (scheduler, utils) = utils();
    let reference = Utc.with_ymd_and_hms(2024, 6, 1, 8, 58, 0).unwrap();
    assert_eq!(utils.relative_time(reference), "2 mins ago");

    scheduler.advance(Duration::from_secs(3 * 3600));
    assert_eq!(utils.relative_time(reference), "3 hrs ago");
}

#[test]
fn future_references_read_as_just_now() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let future = now + TimeDelta::hours(2);
    assert_eq!(format_relative_time(future, now), "Just now");
    assert_eq!(RelativeTimeStyle::Sentence.format(future, now), "just now");
}

#[test]
fn relative_styles() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
    let yesterday = now - TimeDelta::hours(30);
    assert_eq!(RelativeTimeStyle::Calendar.format(yesterday, now), "Yesterday");
    assert_eq!(RelativeTimeStyle::Headline.format(now - TimeDelta::minutes(40), now), "Just now");
    assert_eq!(
        RelativeTimeStyle::Sentence.format(now - TimeDelta::minutes(1), now),
        "1 minute ago"
    );
    let old = Utc.with_ymd_and_hms(2023, 3, 5, 10, 0, 0).unwrap();
    assert_eq!(format_relative_time(old, now), "5 Mar 2023");
}

#[test]
fn timestamps_parse_in_several_shapes() {
    let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
    assert_eq!(parse_timestamp("2024-03-05").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-03-05T00:00:00Z").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-03-05T02:00:00+02:00").unwrap(), expected);
    assert!(parse_timestamp("").is_err());
    assert!(parse_timestamp("soon").is_err());
}

#[test]
fn media_time_formatting() {
    assert_eq!(format_media_time(0.0), "0:00");
    assert_eq!(format_media_time(65.4), "1:05");
    assert_eq!(format_media_time(3600.0), "1:00:00");
}
