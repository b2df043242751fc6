use std::fs;
use std::path::PathBuf;

use skirank_terminal::auth::SignUpOutcome;
use skirank_terminal::backend::BackendError;
use skirank_terminal::comparison::{self, ComparisonOutcome};
use skirank_terminal::detail::{self, EventSummary};
use skirank_terminal::display;
use skirank_terminal::models::{Gender, Points};
use skirank_terminal::supabase::{
    classify_error, parse_athlete_profile_json, parse_athletes_json, parse_comparison_json,
    parse_event_json, parse_event_results_json, parse_favorite_codes_json, parse_session_json,
    parse_signup_json,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_ranked_athletes_with_mixed_number_forms() {
    let raw = read_fixture("athletes_ranked.json");
    let rows = parse_athletes_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    let rossi = &rows[0];
    assert_eq!(rossi.fis_code, "6190001");
    assert_eq!(rossi.age, Some(27));
    assert_eq!(rossi.gender, Some(Gender::Male));
    assert_eq!(rossi.sl.value(), Some(12.34));
    assert!(!rossi.sg.is_available());
    assert!(!rossi.dh.is_available());
    assert_eq!(rossi.ac, Points::new(0.0));
    assert_eq!(rossi.total_points, Some(1450.0));

    let luca = &rows[1];
    assert_eq!(luca.fis_code, "6190002");
    assert_eq!(luca.gender, Some(Gender::Male));
    assert_eq!(luca.age, None);
    assert_eq!(luca.ranking, Some(2));
    assert!(!luca.sl.is_available());
}

#[test]
fn zero_points_and_missing_points_render_differently() {
    let raw = read_fixture("athletes_ranked.json");
    let rows = parse_athletes_json(&raw).expect("fixture should parse");
    assert_eq!(display::format_points(rows[0].ac), "0.00");
    assert_eq!(display::format_points(rows[0].sg), "N/A");
}

#[test]
fn athlete_details_come_back_as_single_row_array() {
    let raw = read_fixture("athlete_details.json");
    let profile = parse_athlete_profile_json(&raw)
        .expect("fixture should parse")
        .expect("profile present");
    assert_eq!(profile.name, "BIANCHI Sofia");
    assert_eq!(profile.gender, Some(Gender::Female));
    assert_eq!(profile.nickname, None);
    assert_eq!(profile.skis.as_deref(), Some("Rossignol"));
    assert!(!profile.gs.is_available());
    assert!(!profile.sg.is_available());
    assert_eq!(profile.dh.value(), Some(44.2));
}

#[test]
fn empty_single_row_answers_mean_not_found() {
    assert_eq!(parse_athlete_profile_json("[]").expect("parse"), None);
    assert_eq!(parse_athlete_profile_json("null").expect("parse"), None);
    assert_eq!(parse_event_json("").expect("parse"), None);
}

#[test]
fn event_results_keep_order_and_compute_times() {
    let raw = read_fixture("event_results.json");
    let rows = parse_event_results_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].bib.as_deref(), Some("7"));
    assert!(rows[0].is_finished());
    assert!(rows[1].is_finished());
    assert!(!rows[2].is_finished());

    let finished: Vec<_> = rows.iter().filter(|r| r.is_finished()).collect();
    let winner = display::winner_time(&finished);
    assert_eq!(winner, Some("2:02.40"));
    assert_eq!(display::result_time(&rows[1], winner), "2:02.95");
    assert_eq!(display::result_gap(&rows[0]), "0.00");
}

#[test]
fn results_table_lists_finishers_with_run_columns() {
    let raw = read_fixture("event_results.json");
    let rows = parse_event_results_json(&raw).expect("fixture should parse");
    let event = parse_event_json(r#"[{"codex":"0001","location":"Soelden (AUT)","gender":"Men's","discipline":"Giant Slalom","category":"WC","date":"2025-10-26"}]"#)
        .expect("parse")
        .expect("event present");
    let summary = EventSummary::new(event, &rows);
    assert_eq!(summary.runs, vec![1, 2]);

    let lines = detail::finished_lines(&rows, &summary.runs);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].rank, "1");
    assert_eq!(lines[0].bib, "7");
    assert_eq!(lines[0].runs, vec!["1:02.10".to_string(), "1:00.30".to_string()]);
    assert_eq!((lines[0].time.as_str(), lines[0].gap.as_str()), ("2:02.40", "0.00"));
    assert_eq!(lines[1].name, "HOLMEN Erik");
    assert_eq!((lines[1].time.as_str(), lines[1].gap.as_str()), ("2:02.95", "+0.55"));
}

#[test]
fn comparison_fixture_drives_head_to_head() {
    let raw = read_fixture("comparison.json");
    let payload = parse_comparison_json(&raw).expect("fixture should parse");
    assert_eq!(payload.races.len(), 4);

    let outcome = comparison::resolve("6190001", "6190003", Ok(payload));
    let ComparisonOutcome::Ready(cmp) = outcome else {
        panic!("expected a ready comparison");
    };
    let stats = &cmp.stats;
    assert_eq!(cmp.second.age, Some(25));
    assert_eq!(stats.shared_races, 3);
    assert_eq!(stats.comparable_races, 2);
    assert_eq!(stats.first.wins, 2);
    assert_eq!(stats.second.wins, 0);
    assert_eq!(stats.first.non_finishes, 1);
    assert_eq!(stats.second.non_finishes, 0);
    assert_eq!(
        stats.closest_finish.as_ref().map(|m| m.event_codex.as_str()),
        Some("0001")
    );
    assert_eq!(stats.biggest_margin.as_ref().map(|m| m.difference), Some(8));
    assert_eq!(
        cmp.races[1].event_date,
        chrono::NaiveDate::from_ymd_opt(2025, 11, 16).expect("valid date")
    );
}

#[test]
fn null_comparison_is_not_found() {
    let payload = parse_comparison_json("null").expect("parse");
    assert!(matches!(
        comparison::resolve("1", "2", Ok(payload)),
        ComparisonOutcome::NotFound
    ));
}

#[test]
fn duplicate_key_body_is_a_conflict() {
    let raw = read_fixture("error_duplicate.json");
    let err = classify_error(400, &raw);
    assert!(err.is_conflict());
    assert!(classify_error(409, "").is_conflict());
    assert_eq!(classify_error(401, "{}"), BackendError::Unauthenticated);
    assert!(matches!(
        classify_error(500, r#"{"message":"boom"}"#),
        BackendError::Remote { status: 500, ref message } if message == "boom"
    ));
}

#[test]
fn favorite_codes_accept_numbers_and_strings() {
    let codes = parse_favorite_codes_json(r#"[{"fis_code":"6190001"},{"fis_code":6290002}]"#)
        .expect("parse");
    assert_eq!(codes, vec!["6190001".to_string(), "6290002".to_string()]);
}

#[test]
fn session_and_signup_answers() {
    let raw = read_fixture("session.json");
    let session = parse_session_json(&raw).expect("fixture should parse");
    assert_eq!(session.label(), "sofia@example.com");
    assert_eq!(session.refresh_token.as_deref(), Some("r3fr3sh"));

    assert!(matches!(
        parse_signup_json(&raw).expect("parse"),
        SignUpOutcome::SignedIn(_)
    ));
    assert_eq!(
        parse_signup_json(r#"{"id":"u1","email":"x@y.z"}"#).expect("parse"),
        SignUpOutcome::ConfirmationSent
    );
}
