use chrono::NaiveDate;

use skirank_terminal::backend::BackendError;
use skirank_terminal::comparison::{ComparisonOutcome, head_to_head, resolve, validate_codes};
use skirank_terminal::error::ValidationError;
use skirank_terminal::models::{
    ComparedAthlete, ComparisonPayload, EventLocation, SharedRace, SideResult,
};

fn side(rank: Option<u32>, status: Option<&str>) -> Option<SideResult> {
    Some(SideResult {
        rank,
        status: status.map(str::to_string),
        ..SideResult::default()
    })
}

fn race(day: u32, discipline: &str, first: Option<SideResult>, second: Option<SideResult>) -> SharedRace {
    SharedRace {
        event_codex: format!("{day:04}"),
        event_date: NaiveDate::from_ymd_opt(2025, 12, day).expect("valid date"),
        location: EventLocation::parse("Val d'Isere (FRA)"),
        discipline: discipline.to_string(),
        category: "WC".to_string(),
        athlete1_result: first,
        athlete2_result: second,
    }
}

fn ranked(day: u32, discipline: &str, a: u32, b: u32) -> SharedRace {
    race(day, discipline, side(Some(a), None), side(Some(b), None))
}

fn athlete(name: &str) -> ComparedAthlete {
    ComparedAthlete {
        name: name.to_string(),
        country: "Italy".to_string(),
        gender: None,
        age: None,
        team: None,
    }
}

#[test]
fn rejects_blank_and_identical_codes_before_any_call() {
    assert_eq!(
        validate_codes("  ", "6190001"),
        Err(ValidationError::MissingComparisonCode)
    );
    assert_eq!(
        validate_codes("6190001", " 6190001 "),
        Err(ValidationError::IdenticalComparisonCodes)
    );
    assert_eq!(
        validate_codes(" 6190001", "6190002 "),
        Ok(("6190001".to_string(), "6190002".to_string()))
    );
}

#[test]
fn counts_wins_ties_and_rank_summaries() {
    let races = vec![
        ranked(1, "GS", 1, 4),
        ranked(2, "GS", 6, 2),
        ranked(3, "SL", 3, 3),
        ranked(4, "SL", 12, 15),
    ];
    let stats = head_to_head(&races);
    assert_eq!(stats.shared_races, 4);
    assert_eq!(stats.comparable_races, 4);
    assert_eq!(stats.first.wins, 2);
    assert_eq!(stats.second.wins, 1);
    assert_eq!(stats.ties, 1);
    assert_eq!(stats.first.best_rank, Some(1));
    assert_eq!(stats.first.worst_rank, Some(12));
    assert_eq!(stats.first.top_three, 2);
    assert_eq!(stats.first.top_ten, 3);
    assert!((stats.first.average_rank - 5.5).abs() < 1e-9);

    let gs = &stats.disciplines["GS"];
    assert_eq!((gs.first_wins, gs.second_wins, gs.total), (1, 1, 2));
    let sl = &stats.disciplines["SL"];
    assert_eq!((sl.first_wins, sl.second_wins, sl.total), (1, 0, 2));
}

#[test]
fn non_finishes_are_counted_but_not_compared() {
    let races = vec![
        race(1, "SL", side(None, Some("DNF")), side(Some(5), None)),
        race(2, "SL", side(Some(2), None), side(None, Some("dsq"))),
        race(3, "SL", side(Some(4), None), None),
        ranked(4, "GS", 8, 3),
    ];
    let stats = head_to_head(&races);
    assert_eq!(stats.shared_races, 3);
    assert_eq!(stats.comparable_races, 1);
    assert_eq!(stats.first.non_finishes, 1);
    assert_eq!(stats.second.non_finishes, 1);
    assert_eq!(stats.second.wins, 1);
    assert!(!stats.disciplines.contains_key("SL"));
}

#[test]
fn margins_keep_the_first_race_on_equal_differences() {
    let races = vec![
        ranked(1, "GS", 1, 3),
        ranked(2, "GS", 10, 2),
        ranked(3, "GS", 5, 7),
        ranked(4, "GS", 20, 12),
    ];
    let stats = head_to_head(&races);
    let closest = stats.closest_finish.expect("closest");
    assert_eq!((closest.event_codex.as_str(), closest.difference), ("0001", 2));
    let biggest = stats.biggest_margin.expect("biggest");
    assert_eq!((biggest.event_codex.as_str(), biggest.difference), ("0002", 8));
    assert_eq!(biggest.location, "Val d'Isere (FRA)");
    assert_eq!(biggest.discipline, "GS");
}

#[test]
fn identical_ranks_everywhere_have_no_biggest_margin() {
    let races = vec![ranked(1, "SG", 4, 4), ranked(2, "SG", 9, 9)];
    let stats = head_to_head(&races);
    assert_eq!(stats.ties, 2);
    assert!(stats.biggest_margin.is_none());
    let closest = stats.closest_finish.expect("closest");
    assert_eq!((closest.event_codex.as_str(), closest.difference), ("0001", 0));
}

#[test]
fn json_report_carries_averages_and_margin_races() {
    let races = vec![ranked(1, "GS", 2, 6), ranked(2, "SL", 4, 5)];
    let stats = head_to_head(&races);
    let value = serde_json::to_value(&stats).expect("serialize");
    assert_eq!(value["first"]["average_rank"], 3.0);
    assert!(value["first"].get("rank_sum").is_none());
    let biggest = &value["biggest_margin"];
    assert_eq!(biggest["event_codex"], "0001");
    assert_eq!(biggest["event_date"], "2025-12-01");
    assert_eq!(biggest["location"], "Val d'Isere (FRA)");
    assert_eq!(biggest["discipline"], "GS");
    assert_eq!(biggest["difference"], 4);
}

#[test]
fn recent_form_covers_last_five_comparable_races() {
    let mut races: Vec<SharedRace> = (1..=4).map(|d| ranked(d, "SL", 1, 2)).collect();
    races.extend((5..=7).map(|d| ranked(d, "SL", 9, 2)));
    races.push(race(8, "SL", side(None, Some("DNS")), side(Some(1), None)));
    let stats = head_to_head(&races);
    assert_eq!(stats.recent_form.races, 5);
    assert_eq!(stats.recent_form.first, 2);
    assert_eq!(stats.recent_form.second, 3);
}

#[test]
fn empty_race_list_gives_zeroed_stats() {
    let stats = head_to_head(&[]);
    assert_eq!(stats.shared_races, 0);
    assert_eq!(stats.first.average_rank, 0.0);
    assert!(stats.closest_finish.is_none());
    assert_eq!(stats.recent_form.races, 0);
}

#[test]
fn resolve_distinguishes_missing_athletes_and_failures() {
    let missing = ComparisonPayload {
        athlete1_details: Some(athlete("ROSSI Marco")),
        athlete2_details: None,
        races: Vec::new(),
    };
    assert!(matches!(
        resolve("1", "2", Ok(missing)),
        ComparisonOutcome::NotFound
    ));
    assert!(matches!(
        resolve("1", "2", Err(BackendError::Transport("offline".to_string()))),
        ComparisonOutcome::Failed(_)
    ));

    let full = ComparisonPayload {
        athlete1_details: Some(athlete("ROSSI Marco")),
        athlete2_details: Some(athlete("HOLMEN Erik")),
        races: vec![ranked(1, "GS", 2, 1)],
    };
    let ComparisonOutcome::Ready(cmp) = resolve("6190001", "6190003", Ok(full)) else {
        panic!("expected ready");
    };
    assert_eq!(cmp.first_code, "6190001");
    assert_eq!(cmp.stats.second.wins, 1);
    let margin = cmp.stats.closest_finish.clone().expect("margin");
    assert_eq!(margin.event_codex, "0001");
}
