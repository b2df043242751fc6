use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{EventResult, Points};

pub const PLACEHOLDER: &str = "-";

/// Two decimals, or "N/A" for the sentinel. Zero is a real score.
pub fn format_points(points: Points) -> String {
    match points.value() {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}

pub fn format_rank(rank: Option<u32>) -> String {
    rank.map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn text_or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => PLACEHOLDER,
    }
}

/// Parses "1:23.45" or "23.45" into seconds.
pub fn parse_race_time(raw: &str) -> Option<f64> {
    let trimmed = raw.trim().trim_start_matches('+');
    let (minutes, rest) = match trimmed.split_once(':') {
        Some((m, rest)) => (m.parse::<u32>().ok()?, rest),
        None => (0, trimmed),
    };
    let (secs, hundredths) = rest.split_once('.')?;
    let secs = secs.parse::<u32>().ok()?;
    let digits = hundredths.get(..2).unwrap_or(hundredths);
    let frac = digits.parse::<u32>().ok()?;
    let scale = if digits.len() == 1 { 10.0 } else { 100.0 };
    Some(f64::from(minutes) * 60.0 + f64::from(secs) + f64::from(frac) / scale)
}

/// Renders seconds as "m:ss.hh", or "ss.hh" under one minute.
pub fn format_race_time(total_seconds: f64) -> String {
    let hundredths = (total_seconds * 100.0).round() as u64;
    let minutes = hundredths / 6000;
    let rest = hundredths % 6000;
    if minutes > 0 {
        format!("{minutes}:{:02}.{:02}", rest / 100, rest % 100)
    } else {
        format!("{}.{:02}", rest / 100, rest % 100)
    }
}

/// Time the winner finished in. Some feeds put it in the gap column.
pub fn winner_time<'a>(finished: &[&'a EventResult]) -> Option<&'a str> {
    let winner = finished.iter().find(|r| r.rank == Some(1))?;
    winner
        .total_time
        .as_deref()
        .or(winner.diff_time.as_deref())
}

/// Total time for a result row, rebuilt from the winner's time plus the
/// "+x.xx" gap when the row only carries a gap.
pub fn result_time(row: &EventResult, winner: Option<&str>) -> String {
    if let Some(total) = row.total_time.as_deref() {
        return total.to_string();
    }
    let Some(diff) = row.diff_time.as_deref() else {
        return PLACEHOLDER.to_string();
    };
    if row.rank == Some(1) {
        return diff.to_string();
    }
    if !diff.starts_with('+') {
        return PLACEHOLDER.to_string();
    }
    let gap = diff.trim_start_matches('+').trim().parse::<f64>().ok();
    match (gap, winner.and_then(parse_race_time)) {
        (Some(gap), Some(base)) => format_race_time(base + gap),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Gap column: the winner always shows "0.00".
pub fn result_gap(row: &EventResult) -> String {
    if row.rank == Some(1) {
        return "0.00".to_string();
    }
    text_or_dash(row.diff_time.as_deref()).to_string()
}

const MONTHS_IT: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

fn weekday_it(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunedì",
        Weekday::Tue => "martedì",
        Weekday::Wed => "mercoledì",
        Weekday::Thu => "giovedì",
        Weekday::Fri => "venerdì",
        Weekday::Sat => "sabato",
        Weekday::Sun => "domenica",
    }
}

pub fn month_name(date: NaiveDate) -> &'static str {
    MONTHS_IT[date.month0() as usize]
}

/// "domenica 26 ottobre 2025"
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {} {} {}",
        weekday_it(date.weekday()),
        date.day(),
        month_name(date),
        date.year()
    )
}

/// "26 ottobre 2025"
pub fn medium_date(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), month_name(date), date.year())
}

/// "26/10/2025"
pub fn short_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_time_roundtrips_minutes() {
        assert_eq!(parse_race_time("1:23.45"), Some(83.45));
        assert_eq!(parse_race_time("54.07"), Some(54.07));
        assert_eq!(format_race_time(83.45), "1:23.45");
        assert_eq!(format_race_time(54.07), "54.07");
        assert_eq!(format_race_time(60.0), "1:00.00");
        assert!(parse_race_time("DNF").is_none());
    }

    #[test]
    fn long_date_is_italian() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 26).expect("valid date");
        assert_eq!(long_date(date), "domenica 26 ottobre 2025");
        assert_eq!(short_date(date), "26/10/2025");
    }
}
