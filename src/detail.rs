use std::thread;

use crate::backend::{Backend, BackendError, BackendResult};
use crate::display;
use crate::models::{AthleteProfile, AthleteResult, Event, EventKey, EventResult};

/// Most recent results shown on the athlete page.
pub const RECENT_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome<T, R> {
    Ready {
        primary: T,
        related: Vec<R>,
        /// Set when the related list failed and was replaced by an empty one.
        related_error: Option<BackendError>,
    },
    NotFound,
    Failed(BackendError),
}

pub type AthleteDetail = DetailOutcome<AthleteProfile, AthleteResult>;
pub type EventDetail = DetailOutcome<EventSummary, EventResult>;

/// A missing primary record wins over everything else; a failing related
/// list only degrades to empty when the primary record is present.
pub fn resolve<T, R>(
    primary: BackendResult<Option<T>>,
    related: BackendResult<Vec<R>>,
) -> DetailOutcome<T, R> {
    match primary {
        Ok(Some(primary)) => {
            let (related, related_error) = match related {
                Ok(rows) => (rows, None),
                Err(err) => (Vec::new(), Some(err)),
            };
            DetailOutcome::Ready {
                primary,
                related,
                related_error,
            }
        }
        Ok(None) | Err(BackendError::NotFound) => DetailOutcome::NotFound,
        Err(err) => DetailOutcome::Failed(err),
    }
}

pub fn fetch_pair<T, R, P, Q>(primary: P, related: Q) -> DetailOutcome<T, R>
where
    T: Send,
    R: Send,
    P: FnOnce() -> BackendResult<Option<T>> + Send,
    Q: FnOnce() -> BackendResult<Vec<R>> + Send,
{
    thread::scope(|scope| {
        let related_job = scope.spawn(related);
        let primary = primary();
        let related = related_job
            .join()
            .unwrap_or_else(|_| Err(BackendError::Transport("worker panicked".to_string())));
        resolve(primary, related)
    })
}

pub fn fetch_athlete(backend: &dyn Backend, fis_code: &str) -> AthleteDetail {
    fetch_pair(
        || backend.athlete_details(fis_code),
        || {
            backend.last_ten_results(fis_code).map(|mut rows| {
                rows.truncate(RECENT_RESULTS);
                rows
            })
        },
    )
}

pub fn fetch_event(backend: &dyn Backend, key: &EventKey) -> EventDetail {
    let outcome = fetch_pair(|| backend.event_details(key), || backend.event_results(key));
    match outcome {
        DetailOutcome::Ready {
            primary,
            related,
            related_error,
        } => {
            let summary = EventSummary::new(primary, &related);
            DetailOutcome::Ready {
                primary: summary,
                related,
                related_error,
            }
        }
        DetailOutcome::NotFound => DetailOutcome::NotFound,
        DetailOutcome::Failed(err) => DetailOutcome::Failed(err),
    }
}

/// Event header plus the run columns that carry data.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event: Event,
    pub runs: Vec<usize>,
}

impl EventSummary {
    pub fn new(event: Event, results: &[EventResult]) -> Self {
        let runs = (1..=4)
            .filter(|run| results.iter().any(|r| run_time(r, *run).is_some()))
            .collect();
        Self { event, runs }
    }
}

pub fn run_time(result: &EventResult, run: usize) -> Option<&str> {
    let value = match run {
        1 => result.run1.as_deref(),
        2 => result.run2.as_deref(),
        3 => result.run3.as_deref(),
        4 => result.run4.as_deref(),
        _ => None,
    };
    value.filter(|v| !v.trim().is_empty())
}

/// Finished rows first, in received order, then everything else.
pub fn split_results(results: &[EventResult]) -> (Vec<&EventResult>, Vec<&EventResult>) {
    results.iter().partition(|r| r.is_finished())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLine {
    pub rank: String,
    pub bib: String,
    pub name: String,
    pub country: String,
    pub runs: Vec<String>,
    pub time: String,
    pub gap: String,
}

/// Finished rows with the listed run columns; missing totals are rebuilt
/// from the winner's time and the row's gap.
pub fn finished_lines(results: &[EventResult], runs: &[usize]) -> Vec<ResultLine> {
    let (finished, _) = split_results(results);
    let winner = display::winner_time(&finished);
    finished
        .iter()
        .map(|row| ResultLine {
            rank: display::format_rank(row.rank),
            bib: display::text_or_dash(row.bib.as_deref()).to_string(),
            name: row.athlete_name.clone(),
            country: row.country.clone(),
            runs: runs
                .iter()
                .map(|run| run_time(row, *run).unwrap_or(display::PLACEHOLDER).to_string())
                .collect(),
            time: display::result_time(row, winner),
            gap: display::result_gap(row),
        })
        .collect()
}
