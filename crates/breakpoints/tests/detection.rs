//! Current-breakpoint selection and transition detection, driven through the
//! headless page so predicate changes arrive the way an engine delivers them.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};

use breakpoints::headless::HeadlessPage;
use breakpoints::{BreakpointConfig, Breakpoints, Detection};
use css_media_queries::MediaEnvironment;

const SM_MD_LG: &str =
    r#"{"sm":"(min-width: 0em)","md":"(min-width: 48em)","lg":"(min-width: 80em)"}"#;

/// Helper: a headless page at `width` x 800 carrying `payload`.
fn page(width: f32, payload: &str) -> HeadlessPage {
    HeadlessPage::new(MediaEnvironment::new(width, 800.0)).with_breakpoint_payload(payload)
}

fn start(page: &HeadlessPage) -> Breakpoints {
    // Surface the runtime's log lines with `RUST_LOG=debug cargo test`.
    let _ = env_logger::builder().is_test(true).try_init();
    Breakpoints::init(page, &BreakpointConfig::default())
        .expect("payload should load")
        .expect("headless page supports breakpoints")
}

fn dispatched(page: &HeadlessPage) -> Vec<(String, bool)> {
    page.events()
        .dispatched_events()
        .iter()
        .map(|event| (event.detail.breakpoint().to_owned(), event.detail.initial()))
        .collect()
}

#[test]
fn sm_md_lg_scenario_selects_widest_match() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);

    assert_eq!(runtime.matches("sm"), Some(true));
    assert_eq!(runtime.matches("md"), Some(true));
    assert_eq!(runtime.matches("lg"), Some(false));
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("md"));
    assert_eq!(runtime.is_at_or_above("sm"), Some(true));
    assert_eq!(runtime.is_below("lg"), Some(true));
    assert!(runtime.is_current("md"));
    assert!(!runtime.is_current("sm"), "sm matches but is not current");
}

#[test]
fn ordinals_follow_authored_order() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);

    assert_eq!(runtime.count(), 3);
    assert_eq!(runtime.names(), ["sm", "md", "lg"]);
    assert_eq!(runtime.ordinal_of("sm"), Some(0));
    assert_eq!(runtime.ordinal_of("lg"), Some(2));
    assert_eq!(runtime.name_at(1).as_deref(), Some("md"));
    assert_eq!(runtime.name_at(3), None);
    assert_eq!(runtime.ordinal_of("xl"), None);
}

#[test]
fn first_determination_is_initial() {
    let page = page(1000.0, SM_MD_LG);
    let _runtime = start(&page);

    assert_eq!(dispatched(&page), [("md".to_owned(), true)]);
}

#[test]
fn single_transition_notifies_exactly_once() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);

    page.resize(1300.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("lg"));
    assert_eq!(runtime.previous_breakpoint().as_deref(), Some("md"));

    // Two predicates flip here (md and lg), still only one transition.
    page.resize(320.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("sm"));

    assert_eq!(
        dispatched(&page),
        [
            ("md".to_owned(), true),
            ("lg".to_owned(), false),
            ("sm".to_owned(), false),
        ]
    );
}

#[test]
fn unrelated_predicate_flip_is_silent() {
    // `xs` toggles with orientation while `md` stays current.
    let payload = r#"{"xs":"(min-width: 0em) and (orientation: portrait)","sm":"(min-width: 30em)","md":"(min-width: 48em)"}"#;
    let page = page(1000.0, payload);
    let runtime = start(&page);
    assert_eq!(runtime.matches("xs"), Some(false));

    page.resize(1000.0, 1200.0);
    assert_eq!(runtime.matches("xs"), Some(true), "portrait now");
    page.resize(1000.0, 800.0);

    assert_eq!(runtime.current_breakpoint().as_deref(), Some("md"));
    assert_eq!(dispatched(&page).len(), 1, "only the initial determination");
}

#[test]
fn resize_within_breakpoint_is_silent() {
    let page = page(900.0, SM_MD_LG);
    let _runtime = start(&page);

    page.resize(1000.0, 800.0);
    page.resize(1279.0, 600.0);

    assert_eq!(dispatched(&page).len(), 1);
}

#[test]
fn higher_ordinal_wins_regardless_of_thresholds() {
    // Authored order is trusted even when thresholds disagree with it.
    let payload = r#"{"wide":"(min-width: 1000px)","narrow":"(min-width: 500px)"}"#;
    let page = page(1200.0, payload);
    let runtime = start(&page);

    assert_eq!(runtime.matches("wide"), Some(true));
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("narrow"));

    page.resize(700.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("narrow"));
    assert_eq!(dispatched(&page).len(), 1, "wide flipping off changes nothing");
}

#[test]
fn no_match_keeps_previous_state() {
    let payload = r#"{"md":"(min-width: 48em)","lg":"(min-width: 80em)"}"#;
    let page = page(320.0, payload);
    let runtime = start(&page);

    assert_eq!(runtime.current_breakpoint(), None);
    assert_eq!(runtime.state().detection(), &Detection::Undetermined);
    assert!(dispatched(&page).is_empty(), "nothing matched, nothing fired");
    assert_eq!(runtime.is_at_or_above("md"), Some(false));
    assert_eq!(runtime.is_below("md"), Some(true));
    assert_eq!(runtime.query_for(None), None);

    page.resize(800.0, 800.0);
    assert_eq!(dispatched(&page), [("md".to_owned(), true)], "first match is initial");

    page.resize(320.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("md"), "state is kept");
    assert_eq!(dispatched(&page).len(), 1, "no notification without a match");
}

#[test]
fn query_for_is_independent_of_current() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);

    assert_eq!(runtime.query_for(Some("md")).as_deref(), Some("(min-width: 48em)"));
    page.resize(1300.0, 800.0);
    assert_eq!(runtime.query_for(Some("md")).as_deref(), Some("(min-width: 48em)"));
    assert_eq!(runtime.query_for(None).as_deref(), Some("(min-width: 80em)"));
    assert_eq!(runtime.query_for(Some("xl")), None);
}

#[test]
fn unknown_names_compare_as_none() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);

    assert_eq!(runtime.is_at_or_above("xl"), None);
    assert_eq!(runtime.is_below("xl"), None);
    assert_eq!(runtime.matches("xl"), None);
    assert!(!runtime.is_current("xl"));
}

#[test]
fn root_font_size_moves_em_thresholds() {
    // 48em at a 20px root is 960px.
    let env = MediaEnvironment::new(900.0, 800.0).with_root_font_size(20.0);
    let page = HeadlessPage::new(env).with_breakpoint_payload(SM_MD_LG);
    let runtime = start(&page);

    assert_eq!(runtime.current_breakpoint().as_deref(), Some("sm"));
    page.resize(960.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("md"));
}

#[test]
fn panicking_listener_does_not_stall_later_resizes() {
    let page = page(1000.0, SM_MD_LG);
    let runtime = start(&page);
    let armed = AtomicBool::new(true);
    runtime.on_change(move |notification| {
        if armed.swap(false, Ordering::SeqCst) {
            panic!("listener failed on {}", notification.breakpoint());
        }
    });

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| page.resize(1300.0, 800.0)));
    assert!(outcome.is_err(), "the listener panic reaches the caller");
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("lg"));

    page.resize(320.0, 800.0);
    assert!((page.environment().width_px - 320.0).abs() < f32::EPSILON, "resize is applied");
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("sm"));

    page.resize(1300.0, 800.0);
    assert_eq!(runtime.current_breakpoint().as_deref(), Some("lg"));
}
