//! Global and per-breakpoint listeners.

use std::sync::{Arc, Mutex};

use breakpoints::headless::HeadlessPage;
use breakpoints::{BreakpointConfig, BreakpointError, Breakpoints, EnterLeave, Scope};
use css_media_queries::MediaEnvironment;

const SM_MD_LG: &str =
    r#"{"sm":"(min-width: 0em)","md":"(min-width: 48em)","lg":"(min-width: 80em)"}"#;

fn start(width: f32) -> (Arc<HeadlessPage>, Breakpoints) {
    let page = Arc::new(
        HeadlessPage::new(MediaEnvironment::new(width, 800.0)).with_breakpoint_payload(SM_MD_LG),
    );
    let runtime = Breakpoints::init(&*page, &BreakpointConfig::default())
        .expect("payload should load")
        .expect("headless page supports breakpoints");
    (page, runtime)
}

/// Shared log of strings written by callbacks.
fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + Clone + 'static) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let log = Arc::clone(&log);
        move |line: String| log.lock().unwrap().push(line)
    };
    (log, sink)
}

#[test]
fn match_change_fires_on_own_predicate_only() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    runtime
        .on_match_change("lg", move |notification, matches| {
            sink(format!("{}:{matches}:{}", notification.breakpoint(), notification.initial()));
        })
        .unwrap();

    page.resize(1100.0, 800.0);
    page.resize(1300.0, 800.0);
    page.resize(1000.0, 800.0);

    assert_eq!(*log.lock().unwrap(), ["lg:true:false", "lg:false:false"]);
}

#[test]
fn match_change_is_not_gated_by_current() {
    let (page, runtime) = start(1300.0);
    let (log, sink) = recorder();
    runtime
        .on_match_change("md", move |notification, matches| {
            sink(format!("{}:{matches}:{}", notification.breakpoint(), notification.media()));
        })
        .unwrap();

    // md is never current here, yet its predicate flips.
    page.resize(320.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("sm"));
    assert_eq!(*log.lock().unwrap(), ["md:false:(min-width: 48em)"]);
}

#[test]
fn enter_leave_immediate_runs_enter_once() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let enter = sink.clone();
    let leave = sink;
    runtime
        .on_enter_leave(
            "md",
            EnterLeave::new()
                .on_enter(move |notification| enter(format!("enter:{}", notification.initial())))
                .on_leave(move |notification| leave(format!("leave:{}", notification.initial())))
                .immediate(true),
        )
        .unwrap();

    assert_eq!(*log.lock().unwrap(), ["enter:true"], "immediate enter only");

    page.resize(320.0, 800.0);
    page.resize(900.0, 800.0);
    assert_eq!(*log.lock().unwrap(), ["enter:true", "leave:false", "enter:false"]);
}

#[test]
fn enter_leave_immediate_reports_leave_when_not_matching() {
    let (_page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let enter = sink.clone();
    let leave = sink;
    runtime
        .on_enter_leave(
            "lg",
            EnterLeave::new()
                .on_enter(move |_| enter("enter".to_owned()))
                .on_leave(move |_| leave("leave".to_owned()))
                .immediate(true),
        )
        .unwrap();

    assert_eq!(*log.lock().unwrap(), ["leave"]);
}

#[test]
fn enter_leave_without_immediate_waits_for_a_flip() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    runtime
        .on_enter_leave("lg", EnterLeave::new().on_enter(move |_| sink("enter".to_owned())))
        .unwrap();
    assert!(log.lock().unwrap().is_empty());

    page.resize(1280.0, 800.0);
    assert_eq!(*log.lock().unwrap(), ["enter"]);
}

#[test]
fn subscribing_to_unknown_breakpoint_fails() {
    let (_page, runtime) = start(1000.0);

    let err = runtime.on_match_change("xl", |_, _| {}).unwrap_err();
    assert!(matches!(err, BreakpointError::UnknownBreakpoint(ref name) if name == "xl"), "{err}");
    assert!(runtime.on_enter_leave("xl", EnterLeave::new()).is_err());
}

#[test]
fn global_listener_sees_every_transition() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let handle = runtime.on_change(move |notification| {
        sink(format!("{}:{}", notification.breakpoint(), notification.initial()));
    });
    assert_eq!(handle.scope, Scope::Global);

    page.resize(1300.0, 800.0);
    page.resize(320.0, 800.0);
    assert_eq!(*log.lock().unwrap(), ["lg:false", "sm:false"]);
}

#[test]
fn unsubscribe_stops_delivery() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let global_sink = sink.clone();
    let global = runtime.on_change(move |notification| global_sink(notification.breakpoint().to_owned()));
    let scoped = runtime
        .on_match_change("lg", move |_, matches| sink(format!("lg:{matches}")))
        .unwrap();

    page.resize(1300.0, 800.0);
    assert!(runtime.unsubscribe(&global));
    assert!(runtime.unsubscribe(&scoped));
    assert!(!runtime.unsubscribe(&global), "already removed");

    page.resize(320.0, 800.0);
    assert_eq!(*log.lock().unwrap(), ["lg", "lg:true"]);
}

#[test]
fn listeners_may_query_the_runtime() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let inner = runtime.clone();
    runtime.on_change(move |_| {
        let current = inner.current_breakpoint().unwrap_or_default();
        let below = inner.is_below("lg").unwrap_or_default();
        sink(format!("{current}:{below}"));
    });

    page.resize(1300.0, 800.0);
    assert_eq!(*log.lock().unwrap(), ["lg:false"]);
}

#[test]
fn resize_from_a_listener_runs_after_the_current_pass() {
    let (page, runtime) = start(1000.0);
    let (log, sink) = recorder();
    let reentrant = Arc::clone(&page);
    let first = Arc::new(Mutex::new(true));
    runtime.on_change(move |notification| {
        sink(notification.breakpoint().to_owned());
        let mut first = first.lock().unwrap();
        if *first {
            *first = false;
            reentrant.resize(320.0, 800.0);
        }
    });
    let (scoped_log, scoped_sink) = recorder();
    runtime
        .on_match_change("lg", move |_, matches| scoped_sink(format!("lg:{matches}")))
        .unwrap();

    page.resize(1300.0, 800.0);

    // The lg listener for the first pass runs before the queued resize.
    assert_eq!(*log.lock().unwrap(), ["lg", "sm"]);
    assert_eq!(*scoped_log.lock().unwrap(), ["lg:true", "lg:false"]);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("sm"));
}
