use chrono::NaiveDate;

use skirank_terminal::backend::{AthleteQuery, AthleteSearch};
use skirank_terminal::demo_backend::DemoBackend;
use skirank_terminal::filters::{AthleteFilterState, AthleteFilters, EventFilters};
use skirank_terminal::models::{Athlete, Discipline, Gender};

fn demo_athlete(code: &str) -> Athlete {
    DemoBackend::new()
        .all_athletes()
        .iter()
        .find(|a| a.fis_code == code)
        .cloned()
        .expect("demo athlete")
}

#[test]
fn empty_filters_use_the_alphabetical_list() {
    assert_eq!(AthleteFilters::default().query(), AthleteQuery::Alphabetical);

    let blank = AthleteFilters {
        name: "   ".to_string(),
        country: "\t".to_string(),
        ..AthleteFilters::default()
    };
    assert!(!blank.is_active());
    assert_eq!(blank.query(), AthleteQuery::Alphabetical);
}

#[test]
fn only_populated_fields_reach_the_search() {
    let filters = AthleteFilters {
        name: " rossi ".to_string(),
        fis_code: " ".to_string(),
        age_min: Some(20),
        ..AthleteFilters::default()
    };
    let AthleteQuery::Filtered(search) = filters.query() else {
        panic!("name filter should search");
    };
    assert_eq!(
        search,
        AthleteSearch {
            name: Some("rossi".to_string()),
            age_min: Some(20),
            ..AthleteSearch::default()
        }
    );
    assert!(search.disciplines.is_none());

    let params = serde_json::to_value(&search).expect("serialize");
    let keys: Vec<&str> = params
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, ["p_age_min", "p_name"]);
}

#[test]
fn disciplines_map_to_points_columns() {
    let mut state = AthleteFilterState::default();
    state.toggle_discipline(Discipline::Slalom);
    state.toggle_discipline(Discipline::Downhill);
    state.toggle_discipline(Discipline::Slalom);
    let AthleteQuery::Filtered(search) = state.filters().query() else {
        panic!("discipline filter should search");
    };
    assert_eq!(
        search.disciplines,
        Some(vec![Discipline::Downhill.points_key()])
    );
    assert_eq!(search.name, None);
}

#[test]
fn clearing_the_name_releases_the_detected_gender() {
    let mut state = AthleteFilterState::default();
    state.set_name("bianchi");
    assert!(state.observe_results(&[demo_athlete("6290001")]));
    assert_eq!(state.detected_gender(), Some(Gender::Female));
    assert!(state.select_gender(Some(Gender::Male)).is_err());

    state.set_name("");
    assert_eq!(state.detected_gender(), None);
    state
        .select_gender(Some(Gender::Male))
        .expect("gender is free again");
    assert_eq!(state.filters().gender, Some(Gender::Male));
}

#[test]
fn event_filters_report_activity_apart_from_the_window() {
    let today = NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date");
    let mut filters = EventFilters::new(today);
    filters.cycle_view();
    filters.step(true);
    assert!(!filters.has_active_filters());

    filters.set_country(Some("  "));
    assert!(!filters.has_active_filters());
    filters.set_country(Some("sui"));
    assert_eq!(filters.country.as_deref(), Some("SUI"));
    assert!(filters.has_active_filters());

    filters.reset();
    assert!(!filters.has_active_filters());
    assert_ne!(filters.date, today, "reset keeps the date");
}
