use chrono::NaiveDate;

use skirank_terminal::models::EventKey;
use skirank_terminal::router::{NavigationState, Page, ViewRouter, decode, encode};

fn event(codex: &str, y: i32, m: u32, d: u32) -> NavigationState {
    let date = NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
    NavigationState::Event(EventKey::new(codex, date).expect("valid key"))
}

#[test]
fn decodes_page_tags_with_or_without_hash() {
    assert_eq!(decode("#gare"), NavigationState::Page(Page::Events));
    assert_eq!(decode("preferiti"), NavigationState::Page(Page::Favorites));
    assert_eq!(decode(" #chi-siamo "), NavigationState::Page(Page::About));
    assert_eq!(decode(""), NavigationState::Page(Page::Rank));
}

#[test]
fn decodes_athlete_and_event_fragments() {
    assert_eq!(
        decode("#athlete-6190001"),
        NavigationState::Athlete("6190001".to_string())
    );
    assert_eq!(decode("event-0001-2025-10-26"), event("0001", 2025, 10, 26));
}

#[test]
fn malformed_fragments_fall_back_to_root() {
    for raw in [
        "athlete-",
        "event-0001",
        "event--2025-10-26",
        "event-0001-2025--26",
        "event-0001-2025-13-40",
        "unknown-page",
    ] {
        assert_eq!(decode(raw), NavigationState::default(), "fragment {raw:?}");
    }
}

#[test]
fn encode_matches_decode() {
    let states = [
        NavigationState::Page(Page::Compare),
        NavigationState::Athlete("6290005".to_string()),
        event("0311", 2025, 12, 19),
    ];
    for state in states {
        assert_eq!(decode(&encode(&state)), state);
    }
    assert_eq!(encode(&event("0402", 2026, 1, 17)), "event-0402-2026-01-17");
}

#[test]
fn back_returns_to_the_single_saved_snapshot() {
    let mut router = ViewRouter::new(NavigationState::Page(Page::Athletes));
    router.navigate_to(NavigationState::Athlete("6190001".to_string()));
    assert_eq!(router.fragment(), "athlete-6190001");

    router.go_back();
    assert_eq!(router.current(), &NavigationState::Page(Page::Athletes));

    // Only one snapshot is kept, so a second back lands on the root.
    router.go_back();
    assert_eq!(router.current(), &NavigationState::Page(Page::Rank));
}

#[test]
fn external_fragment_change_keeps_saved_snapshot() {
    let mut router = ViewRouter::new(NavigationState::Page(Page::Events));
    router.navigate_to(event("0001", 2025, 10, 26));
    router.apply_fragment("#confronto");
    assert_eq!(router.current(), &NavigationState::Page(Page::Compare));
    assert_eq!(router.previous(), Some(&NavigationState::Page(Page::Events)));
}

#[test]
fn navigation_resets_scroll() {
    let mut router = ViewRouter::default();
    router.scroll_down(10);
    router.scroll_down(10);
    assert_eq!(router.scroll(), 2);
    router.navigate_to(NavigationState::Page(Page::About));
    assert_eq!(router.scroll(), 0);
}
