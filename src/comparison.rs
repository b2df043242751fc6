use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::backend::BackendError;
use crate::error::ValidationError;
use crate::models::{ComparedAthlete, ComparisonPayload, SharedRace, SideResult};

pub const NON_FINISH_CODES: [&str; 3] = ["DNF", "DSQ", "DNS"];
pub const RECENT_FORM_WINDOW: usize = 5;

/// Trims both codes and rejects blanks or duplicates before any remote call.
pub fn validate_codes(first: &str, second: &str) -> Result<(String, String), ValidationError> {
    let first = first.trim();
    let second = second.trim();
    if first.is_empty() || second.is_empty() {
        return Err(ValidationError::MissingComparisonCode);
    }
    if first == second {
        return Err(ValidationError::IdenticalComparisonCodes);
    }
    Ok((first.to_string(), second.to_string()))
}

pub fn is_non_finish(result: &SideResult) -> bool {
    result
        .status
        .as_deref()
        .map(|s| s.trim().to_ascii_uppercase())
        .is_some_and(|s| NON_FINISH_CODES.contains(&s.as_str()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideStats {
    pub wins: u32,
    pub non_finishes: u32,
    pub ranked_races: u32,
    #[serde(skip)]
    rank_sum: u64,
    pub average_rank: f64,
    pub best_rank: Option<u32>,
    pub worst_rank: Option<u32>,
    pub top_three: u32,
    pub top_ten: u32,
}

impl SideStats {
    fn record_rank(&mut self, rank: u32) {
        self.ranked_races += 1;
        self.rank_sum += u64::from(rank);
        self.average_rank = self.rank_sum as f64 / f64::from(self.ranked_races);
        self.best_rank = Some(self.best_rank.map_or(rank, |b| b.min(rank)));
        self.worst_rank = Some(self.worst_rank.map_or(rank, |w| w.max(rank)));
        if rank <= 3 {
            self.top_three += 1;
        }
        if rank <= 10 {
            self.top_ten += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DisciplineTally {
    pub first_wins: u32,
    pub second_wins: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub difference: u32,
    pub event_codex: String,
    #[serde(serialize_with = "iso_day")]
    pub event_date: NaiveDate,
    pub location: String,
    pub discipline: String,
}

impl Margin {
    fn at(race: &SharedRace, difference: u32) -> Self {
        Self {
            difference,
            event_codex: race.event_codex.clone(),
            event_date: race.event_date,
            location: race.location.to_string(),
            discipline: race.discipline.clone(),
        }
    }
}

fn iso_day<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecentForm {
    pub first: u32,
    pub second: u32,
    pub races: u32,
}

/// Head-to-head statistics over the races both athletes have a result in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadToHead {
    pub shared_races: u32,
    pub comparable_races: u32,
    pub ties: u32,
    pub first: SideStats,
    pub second: SideStats,
    pub disciplines: BTreeMap<String, DisciplineTally>,
    pub closest_finish: Option<Margin>,
    pub biggest_margin: Option<Margin>,
    pub recent_form: RecentForm,
}

/// Single pass over `races` in the order received.
pub fn head_to_head(races: &[SharedRace]) -> HeadToHead {
    let mut stats = HeadToHead::default();
    let mut recent: VecDeque<Ordering> = VecDeque::with_capacity(RECENT_FORM_WINDOW);

    for race in races {
        let (Some(r1), Some(r2)) = (&race.athlete1_result, &race.athlete2_result) else {
            continue;
        };
        stats.shared_races += 1;

        let dnf1 = is_non_finish(r1);
        let dnf2 = is_non_finish(r2);
        if dnf1 {
            stats.first.non_finishes += 1;
        }
        if dnf2 {
            stats.second.non_finishes += 1;
        }

        let (Some(rank1), Some(rank2)) = (r1.rank, r2.rank) else {
            continue;
        };
        if dnf1 || dnf2 {
            continue;
        }

        stats.comparable_races += 1;
        let tally = stats.disciplines.entry(race.discipline.clone()).or_default();
        tally.total += 1;

        let outcome = rank1.cmp(&rank2);
        match outcome {
            Ordering::Less => {
                stats.first.wins += 1;
                tally.first_wins += 1;
            }
            Ordering::Greater => {
                stats.second.wins += 1;
                tally.second_wins += 1;
            }
            Ordering::Equal => stats.ties += 1,
        }

        let difference = rank1.abs_diff(rank2);
        if stats
            .closest_finish
            .as_ref()
            .is_none_or(|m| difference < m.difference)
        {
            stats.closest_finish = Some(Margin::at(race, difference));
        }
        if difference > stats.biggest_margin.as_ref().map_or(0, |m| m.difference) {
            stats.biggest_margin = Some(Margin::at(race, difference));
        }

        stats.first.record_rank(rank1);
        stats.second.record_rank(rank2);

        if recent.len() == RECENT_FORM_WINDOW {
            recent.pop_front();
        }
        recent.push_back(outcome);
    }

    for outcome in &recent {
        match outcome {
            Ordering::Less => stats.recent_form.first += 1,
            Ordering::Greater => stats.recent_form.second += 1,
            Ordering::Equal => {}
        }
    }
    stats.recent_form.races = recent.len() as u32;
    stats
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub first_code: String,
    pub second_code: String,
    #[serde(skip)]
    pub first: ComparedAthlete,
    #[serde(skip)]
    pub second: ComparedAthlete,
    #[serde(skip)]
    pub races: Vec<SharedRace>,
    pub stats: HeadToHead,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    Ready(Box<Comparison>),
    NotFound,
    Failed(BackendError),
}

/// Statistics are only computed when both athletes came back.
pub fn resolve(
    first_code: &str,
    second_code: &str,
    result: Result<ComparisonPayload, BackendError>,
) -> ComparisonOutcome {
    let payload = match result {
        Ok(payload) => payload,
        Err(BackendError::NotFound) => return ComparisonOutcome::NotFound,
        Err(err) => return ComparisonOutcome::Failed(err),
    };
    let (Some(first), Some(second)) = (payload.athlete1_details, payload.athlete2_details) else {
        return ComparisonOutcome::NotFound;
    };
    let stats = head_to_head(&payload.races);
    ComparisonOutcome::Ready(Box::new(Comparison {
        first_code: first_code.to_string(),
        second_code: second_code.to_string(),
        first,
        second,
        races: payload.races,
        stats,
    }))
}

pub fn short_name(full_name: &str) -> &str {
    full_name.split_whitespace().last().unwrap_or(full_name)
}
