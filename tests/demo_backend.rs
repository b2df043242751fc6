use chrono::NaiveDate;

use skirank_terminal::backend::{AthleteQuery, AthleteSearch, Backend, EventQuery, PageWindow};
use skirank_terminal::calendar::{ViewMode, window_for};
use skirank_terminal::comparison::{ComparisonOutcome, resolve};
use skirank_terminal::detail::{self, DetailOutcome};
use skirank_terminal::display;
use skirank_terminal::models::{Discipline, EventKey, Gender};

const ALL: PageWindow = PageWindow {
    offset: 0,
    limit: 100,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn ranking_is_ordered_and_paged() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let first = backend
        .ranked_athletes(Gender::Male, PageWindow { offset: 0, limit: 2 })
        .expect("page");
    let ranks: Vec<Option<u32>> = first.iter().map(|a| a.ranking).collect();
    assert_eq!(ranks, [Some(1), Some(2)]);

    let rest = backend
        .ranked_athletes(Gender::Male, PageWindow { offset: 2, limit: 10 })
        .expect("page");
    assert_eq!(rest.len(), 4);
    assert!(rest.iter().all(|a| a.gender == Some(Gender::Male)));
}

#[test]
fn alphabetical_and_filtered_athlete_lists() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let all = backend
        .athletes(&AthleteQuery::Alphabetical, ALL)
        .expect("list");
    assert_eq!(all.len(), 12);
    assert!(all.windows(2).all(|w| w[0].name <= w[1].name));

    let italians = backend
        .athletes(
            &AthleteQuery::Filtered(AthleteSearch {
                country: Some("Italy".to_string()),
                ..AthleteSearch::default()
            }),
            ALL,
        )
        .expect("list");
    let codes: Vec<&str> = italians.iter().map(|a| a.fis_code.as_str()).collect();
    assert_eq!(codes, ["6290001", "6190001"]);

    // Athletes without downhill points drop out; the rest sort by the sum.
    let downhillers = backend
        .athletes(
            &AthleteQuery::Filtered(AthleteSearch {
                disciplines: Some(vec![Discipline::Downhill.points_key()]),
                ..AthleteSearch::default()
            }),
            ALL,
        )
        .expect("list");
    assert_eq!(downhillers.first().map(|a| a.fis_code.as_str()), Some("6190004"));
    assert!(downhillers.iter().all(|a| a.dh.is_available()));
}

#[test]
fn event_calendar_respects_window_and_filters() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let query = EventQuery {
        gender: None,
        disciplines: Vec::new(),
        window: window_for(ViewMode::Monthly, day(2025, 12, 10)),
    };
    let december = backend.events(&query, ALL).expect("events");
    assert_eq!(december.len(), 6);
    assert!(december.iter().any(|e| e.cancelled));
    assert!(december.windows(2).all(|w| w[0].date <= w[1].date));

    let women_slalom = EventQuery {
        gender: Some(Gender::Female),
        disciplines: vec![Discipline::Slalom],
        ..query
    };
    let rows = backend.events(&women_slalom, ALL).expect("events");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].codex, "0312");
}

#[test]
fn event_detail_assembles_finishers_and_non_finishers() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let key = EventKey::new("0002", day(2025, 10, 25)).expect("key");
    let DetailOutcome::Ready {
        primary,
        related,
        related_error,
    } = detail::fetch_event(&backend, &key)
    else {
        panic!("demo event should load");
    };
    assert_eq!(primary.event.location.country, "AUT");
    assert!(related_error.is_none());
    assert_eq!(related.len(), 6);

    let finished: Vec<_> = related.iter().filter(|r| r.is_finished()).collect();
    assert_eq!(finished.len(), 5);
    let winner = display::winner_time(&finished);
    assert!(winner.is_some());
    // The third finisher only carries a gap; its time is rebuilt from the winner's.
    assert_ne!(
        display::result_time(finished[2], winner),
        display::PLACEHOLDER
    );
}

#[test]
fn missing_event_is_not_found() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let key = EventKey::new("9999", day(2025, 10, 25)).expect("key");
    assert!(matches!(
        detail::fetch_event(&backend, &key),
        DetailOutcome::NotFound
    ));
}

#[test]
fn athlete_detail_lists_recent_results_newest_first() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let DetailOutcome::Ready {
        primary, related, ..
    } = detail::fetch_athlete(&backend, "6190001")
    else {
        panic!("demo athlete should load");
    };
    assert_eq!(primary.name, "ROSSI Marco");
    assert!(!related.is_empty() && related.len() <= 10);
    assert!(related.windows(2).all(|w| w[0].event_date >= w[1].event_date));
}

#[test]
fn head_to_head_over_demo_results() {
    let backend = skirank_terminal::demo_backend::DemoBackend::new();
    let payload = backend.compare_athletes("6190001", "6190003");
    let ComparisonOutcome::Ready(cmp) = resolve("6190001", "6190003", payload) else {
        panic!("both demo athletes exist");
    };
    assert_eq!(cmp.second.name, "HOLMEN Erik");
    let stats = &cmp.stats;
    assert!(stats.shared_races > 0);
    assert_eq!(
        stats.first.wins + stats.second.wins + stats.ties,
        stats.comparable_races
    );

    let payload = backend.compare_athletes("6190001", "0000000");
    assert!(matches!(
        resolve("6190001", "0000000", payload),
        ComparisonOutcome::NotFound
    ));
}
