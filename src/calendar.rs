use chrono::{Datelike, Days, Months, NaiveDate};

use crate::display::{long_date, medium_date, month_name};
use crate::models::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl ViewMode {
    pub fn cycle(self) -> Self {
        match self {
            ViewMode::Daily => ViewMode::Weekly,
            ViewMode::Weekly => ViewMode::Monthly,
            ViewMode::Monthly => ViewMode::Daily,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ViewMode::Daily => "Giornaliera",
            ViewMode::Weekly => "Settimanale",
            ViewMode::Monthly => "Mensile",
        }
    }
}

/// Inclusive date range queried for one calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Weeks run Monday to Sunday; months from the 1st to the last day.
pub fn window_for(mode: ViewMode, date: NaiveDate) -> DateWindow {
    match mode {
        ViewMode::Daily => DateWindow::single(date),
        ViewMode::Weekly => {
            let back = u64::from(date.weekday().num_days_from_monday());
            let start = date.checked_sub_days(Days::new(back)).unwrap_or(date);
            let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
            DateWindow { start, end }
        }
        ViewMode::Monthly => {
            let start = date.with_day(1).unwrap_or(date);
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(start);
            DateWindow { start, end }
        }
    }
}

/// Moves the selected date one view-length forward or back.
pub fn step(mode: ViewMode, date: NaiveDate, forward: bool) -> NaiveDate {
    let moved = match (mode, forward) {
        (ViewMode::Daily, true) => date.checked_add_days(Days::new(1)),
        (ViewMode::Daily, false) => date.checked_sub_days(Days::new(1)),
        (ViewMode::Weekly, true) => date.checked_add_days(Days::new(7)),
        (ViewMode::Weekly, false) => date.checked_sub_days(Days::new(7)),
        (ViewMode::Monthly, true) => date.checked_add_months(Months::new(1)),
        (ViewMode::Monthly, false) => date.checked_sub_months(Months::new(1)),
    };
    moved.unwrap_or(date)
}

/// Header caption for the current view.
pub fn caption(mode: ViewMode, date: NaiveDate) -> String {
    match mode {
        ViewMode::Daily => long_date(date),
        ViewMode::Weekly => {
            let window = window_for(mode, date);
            format!("{} - {}", medium_date(window.start), medium_date(window.end))
        }
        ViewMode::Monthly => format!("{} {}", month_name(date), date.year()),
    }
}

/// Groups events by date, keeping the incoming order inside each day.
pub fn group_by_date<'a, I>(events: I) -> Vec<(NaiveDate, Vec<&'a Event>)>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut groups: Vec<(NaiveDate, Vec<&'a Event>)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(date, _)| *date == event.date) {
            Some((_, bucket)) => bucket.push(event),
            None => groups.push((event.date, vec![event])),
        }
    }
    groups.sort_by_key(|(date, _)| *date);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-10-26 is a Sunday.
        let w = window_for(ViewMode::Weekly, day(2025, 10, 26));
        assert_eq!(w.start, day(2025, 10, 20));
        assert_eq!(w.end, day(2025, 10, 26));
    }

    #[test]
    fn month_window_covers_leap_february() {
        let w = window_for(ViewMode::Monthly, day(2028, 2, 14));
        assert_eq!(w.start, day(2028, 2, 1));
        assert_eq!(w.end, day(2028, 2, 29));
    }

    #[test]
    fn monthly_step_clamps_day() {
        assert_eq!(step(ViewMode::Monthly, day(2026, 1, 31), true), day(2026, 2, 28));
        assert_eq!(step(ViewMode::Weekly, day(2026, 1, 1), false), day(2025, 12, 25));
    }
}
