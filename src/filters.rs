use chrono::NaiveDate;

use crate::backend::{AthleteQuery, AthleteSearch, EventQuery};
use crate::calendar::{self, DateWindow, ViewMode};
use crate::error::ValidationError;
use crate::models::{Athlete, Discipline, Event, Gender};

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn toggle_in<T: PartialEq + Copy>(set: &mut Vec<T>, item: T) {
    if let Some(pos) = set.iter().position(|d| *d == item) {
        set.remove(pos);
    } else {
        set.push(item);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AthleteFilters {
    pub name: String,
    pub fis_code: String,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub country: String,
    pub gender: Option<Gender>,
    pub disciplines: Vec<Discipline>,
}

impl AthleteFilters {
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty()
            || !self.fis_code.trim().is_empty()
            || self.age_min.is_some()
            || self.age_max.is_some()
            || !self.country.trim().is_empty()
            || self.gender.is_some()
            || !self.disciplines.is_empty()
    }

    fn searches_identity(&self) -> bool {
        !self.name.trim().is_empty() || !self.fis_code.trim().is_empty()
    }

    /// Unfiltered lists go to the alphabetical procedure, never to the
    /// search procedure with empty arguments.
    pub fn query(&self) -> AthleteQuery {
        if !self.is_active() {
            return AthleteQuery::Alphabetical;
        }
        AthleteQuery::Filtered(AthleteSearch {
            name: non_empty(&self.name),
            fis_code: non_empty(&self.fis_code),
            age_min: self.age_min,
            age_max: self.age_max,
            country: non_empty(&self.country),
            gender: self.gender.map(|g| g.athlete_value().to_string()),
            disciplines: if self.disciplines.is_empty() {
                None
            } else {
                Some(self.disciplines.iter().map(|d| d.points_key()).collect())
            },
        })
    }

    /// "Ranking Mondiale", or e.g. "Ranking Italy - Donne - SL + GS".
    pub fn ranking_caption(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(country) = non_empty(&self.country) {
            parts.push(country);
        }
        if let Some(gender) = self.gender {
            parts.push(gender.label().to_string());
        }
        if !self.disciplines.is_empty() {
            let joined = self
                .disciplines
                .iter()
                .map(|d| d.abbr())
                .collect::<Vec<_>>()
                .join(" + ");
            parts.push(joined);
        }
        if parts.is_empty() {
            "Ranking Mondiale".to_string()
        } else {
            format!("Ranking {}", parts.join(" - "))
        }
    }
}

/// Athletes page filters together with the auto-detected gender lock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AthleteFilterState {
    filters: AthleteFilters,
    detected_gender: Option<Gender>,
}

impl AthleteFilterState {
    pub fn filters(&self) -> &AthleteFilters {
        &self.filters
    }

    pub fn detected_gender(&self) -> Option<Gender> {
        self.detected_gender
    }

    pub fn set_name(&mut self, value: &str) {
        self.filters.name = value.to_string();
        if value.trim().is_empty() {
            self.detected_gender = None;
        }
    }

    pub fn set_fis_code(&mut self, value: &str) {
        self.filters.fis_code = value.to_string();
        if value.trim().is_empty() {
            self.detected_gender = None;
        }
    }

    pub fn set_country(&mut self, value: &str) {
        self.filters.country = value.to_string();
    }

    pub fn set_age_min(&mut self, value: Option<u32>) {
        self.filters.age_min = value;
    }

    pub fn set_age_max(&mut self, value: Option<u32>) {
        self.filters.age_max = value;
    }

    /// Rejects the opposite of an auto-detected gender.
    pub fn select_gender(&mut self, gender: Option<Gender>) -> Result<(), ValidationError> {
        if let (Some(detected), Some(wanted)) = (self.detected_gender, gender)
            && wanted != detected
        {
            return Err(ValidationError::GenderLocked(detected));
        }
        self.filters.gender = gender;
        Ok(())
    }

    /// Selecting the active gender again clears it.
    pub fn toggle_gender(&mut self, gender: Gender) -> Result<(), ValidationError> {
        if self.filters.gender == Some(gender) {
            self.select_gender(None)
        } else {
            self.select_gender(Some(gender))
        }
    }

    pub fn toggle_discipline(&mut self, discipline: Discipline) {
        toggle_in(&mut self.filters.disciplines, discipline);
    }

    pub fn reset(&mut self) {
        self.filters = AthleteFilters::default();
        self.detected_gender = None;
    }

    /// Folds a fetched page into the filter state. When a name or code
    /// search returns a single gender it becomes the active gender filter.
    /// Returns true when the filters changed and the list must be refetched.
    pub fn observe_results(&mut self, rows: &[Athlete]) -> bool {
        if rows.is_empty() || !self.filters.searches_identity() {
            self.detected_gender = None;
            return false;
        }
        let mut seen: Vec<Gender> = Vec::new();
        for gender in rows.iter().filter_map(|a| a.gender) {
            if !seen.contains(&gender) {
                seen.push(gender);
            }
        }
        match seen.as_slice() {
            [only] => {
                self.detected_gender = Some(*only);
                if self.filters.gender != Some(*only) {
                    self.filters.gender = Some(*only);
                    return true;
                }
                false
            }
            _ => {
                self.detected_gender = None;
                false
            }
        }
    }
}

/// Filter record of the event calendar page, view granularity included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilters {
    pub gender: Option<Gender>,
    pub disciplines: Vec<Discipline>,
    pub country: Option<String>,
    pub view: ViewMode,
    pub date: NaiveDate,
}

impl EventFilters {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            gender: None,
            disciplines: Vec::new(),
            country: None,
            view: ViewMode::Daily,
            date: today,
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.gender.is_some() || !self.disciplines.is_empty() || self.country.is_some()
    }

    pub fn window(&self) -> DateWindow {
        calendar::window_for(self.view, self.date)
    }

    pub fn query(&self) -> EventQuery {
        EventQuery {
            gender: self.gender,
            disciplines: self.disciplines.clone(),
            window: self.window(),
        }
    }

    /// Selecting the active gender again clears it.
    pub fn toggle_gender(&mut self, gender: Gender) {
        self.gender = if self.gender == Some(gender) {
            None
        } else {
            Some(gender)
        };
    }

    pub fn toggle_discipline(&mut self, discipline: Discipline) {
        toggle_in(&mut self.disciplines, discipline);
    }

    pub fn set_country(&mut self, code: Option<&str>) {
        self.country = code.and_then(non_empty).map(|c| c.to_ascii_uppercase());
    }

    /// Filters only; the selected date and view are kept.
    pub fn reset(&mut self) {
        self.gender = None;
        self.disciplines.clear();
        self.country = None;
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.cycle();
    }

    pub fn step(&mut self, forward: bool) {
        self.date = calendar::step(self.view, self.date, forward);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.view = ViewMode::Daily;
        self.date = today;
    }

    /// Country is matched client-side against the parsed event location.
    pub fn matches_country(&self, event: &Event) -> bool {
        match &self.country {
            Some(code) => event.location.country == *code,
            None => true,
        }
    }

    pub fn visible<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        events.iter().filter(|e| self.matches_country(e)).collect()
    }
}
