use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Points value the backend uses for "no valid points".
pub const NO_POINTS_SENTINEL: f64 = 9999.0;

/// Ranking points for one discipline. `None` means not available, which
/// covers the 9999 sentinel in numeric or string form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Points(Option<f64>);

impl Points {
    pub fn new(value: f64) -> Self {
        if !value.is_finite() || value >= NO_POINTS_SENTINEL {
            Self(None)
        } else {
            Self(Some(value))
        }
    }

    pub const fn unavailable() -> Self {
        Self(None)
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_available(self) -> bool {
        self.0.is_some()
    }

    /// Parses the raw forms seen on the wire: numbers, numeric strings,
    /// `"9999"`, `"null"`, empty strings.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
            return Self(None);
        }
        trimmed
            .parse::<f64>()
            .map(Self::new)
            .unwrap_or(Self(None))
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64().map(Points::new).unwrap_or_default(),
            Value::String(s) => Points::parse(&s),
            _ => Points::unavailable(),
        })
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_f64(NO_POINTS_SENTINEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Accepts both the athlete form ("Male") and the event form ("Men's").
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" | "men's" | "men" => Some(Self::Male),
            "female" | "f" | "women's" | "women" | "ladies" => Some(Self::Female),
            _ => None,
        }
    }

    /// Value the athlete procedures expect.
    pub const fn athlete_value(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    /// Value stored on event rows.
    pub const fn event_value(self) -> &'static str {
        match self {
            Self::Male => "Men's",
            Self::Female => "Women's",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Uomini",
            Self::Female => "Donne",
        }
    }

    pub const fn singular_label(self) -> &'static str {
        match self {
            Self::Male => "uomo",
            Self::Female => "donna",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discipline {
    Slalom,
    GiantSlalom,
    SuperG,
    Downhill,
    DownhillTraining,
    AlpineCombined,
}

impl Discipline {
    /// Disciplines carrying ranking points on the athlete record.
    pub const RANKED: [Discipline; 5] = [
        Discipline::Slalom,
        Discipline::GiantSlalom,
        Discipline::SuperG,
        Discipline::Downhill,
        Discipline::AlpineCombined,
    ];

    /// Disciplines offered by the event calendar.
    pub const CALENDAR: [Discipline; 6] = [
        Discipline::Slalom,
        Discipline::GiantSlalom,
        Discipline::SuperG,
        Discipline::Downhill,
        Discipline::DownhillTraining,
        Discipline::AlpineCombined,
    ];

    pub const fn abbr(self) -> &'static str {
        match self {
            Self::Slalom => "SL",
            Self::GiantSlalom => "GS",
            Self::SuperG => "SG",
            Self::Downhill => "DH",
            Self::DownhillTraining => "DHTR",
            Self::AlpineCombined => "AC",
        }
    }

    /// Full name as stored in the events table.
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Slalom => "Slalom",
            Self::GiantSlalom => "Giant Slalom",
            Self::SuperG => "Super G",
            Self::Downhill => "Downhill",
            Self::DownhillTraining => "Downhill Training",
            Self::AlpineCombined => "Alpine Combined",
        }
    }

    /// Lowercase key the athlete search procedure takes.
    pub fn points_key(self) -> String {
        self.abbr().to_ascii_lowercase()
    }

    pub fn from_full_name(name: &str) -> Option<Self> {
        Self::CALENDAR
            .into_iter()
            .find(|d| d.full_name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Event identity: codex alone repeats across seasons, codex + date does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    codex: String,
    date: NaiveDate,
}

impl EventKey {
    /// The codex must be non-empty and free of `-`, which separates it from
    /// the date in route fragments.
    pub fn new(codex: &str, date: NaiveDate) -> Option<Self> {
        let codex = codex.trim();
        if codex.is_empty() || codex.contains('-') {
            return None;
        }
        Some(Self {
            codex: codex.to_string(),
            date,
        })
    }

    pub fn parse(codex: &str, date: &str) -> Option<Self> {
        Self::new(codex, parse_iso_date(date)?)
    }

    pub fn codex(&self) -> &str {
        &self.codex
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.codex, self.date_string())
    }
}

/// Event location stored as `"Place (AUT)"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventLocation {
    pub place: String,
    pub country: String,
}

impl EventLocation {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(body) = trimmed.strip_suffix(')')
            && let Some(open) = body.rfind('(')
        {
            let code = &body[open + 1..];
            let place = body[..open].trim();
            if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) && !place.is_empty()
            {
                return Self {
                    place: place.to_string(),
                    country: code.to_string(),
                };
            }
        }
        Self {
            place: trimmed.to_string(),
            country: String::new(),
        }
    }
}

impl fmt::Display for EventLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.place)
        } else {
            write!(f, "{} ({})", self.place, self.country)
        }
    }
}

impl<'de> Deserialize<'de> for EventLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(EventLocation::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Athlete {
    #[serde(deserialize_with = "lenient_string")]
    pub fis_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub sl: Points,
    #[serde(default)]
    pub gs: Points,
    #[serde(default)]
    pub sg: Points,
    #[serde(default)]
    pub dh: Points,
    #[serde(default)]
    pub ac: Points,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_points: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub ranking: Option<u32>,
}

impl Athlete {
    pub fn points(&self, discipline: Discipline) -> Points {
        match discipline {
            Discipline::Slalom => self.sl,
            Discipline::GiantSlalom => self.gs,
            Discipline::SuperG => self.sg,
            Discipline::Downhill => self.dh,
            Discipline::AlpineCombined => self.ac,
            Discipline::DownhillTraining => Points::unavailable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AthleteProfile {
    #[serde(deserialize_with = "lenient_string")]
    pub fis_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub birthdate: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub children: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub occupation: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub residence: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub languages: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub hobbies: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub skis: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub boots: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub poles: Option<String>,
    #[serde(default)]
    pub sl: Points,
    #[serde(default)]
    pub gs: Points,
    #[serde(default)]
    pub sg: Points,
    #[serde(default)]
    pub dh: Points,
    #[serde(default)]
    pub ac: Points,
}

impl AthleteProfile {
    pub fn points(&self, discipline: Discipline) -> Points {
        match discipline {
            Discipline::Slalom => self.sl,
            Discipline::GiantSlalom => self.gs,
            Discipline::SuperG => self.sg,
            Discipline::Downhill => self.dh,
            Discipline::AlpineCombined => self.ac,
            Discipline::DownhillTraining => Points::unavailable(),
        }
    }
}

/// One of an athlete's recent results, joined with its event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AthleteResult {
    #[serde(deserialize_with = "lenient_string")]
    pub codex: String,
    #[serde(default)]
    pub location: EventLocation,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub discipline: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "iso_date")]
    pub event_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bib: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub total_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub diff_time: Option<String>,
    #[serde(default)]
    pub fis_points: Points,
    #[serde(default)]
    pub cup_points: Points,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
}

impl AthleteResult {
    pub fn event_key(&self) -> Option<EventKey> {
        EventKey::new(&self.codex, self.event_date)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "lenient_string")]
    pub codex: String,
    #[serde(default)]
    pub location: EventLocation,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub discipline: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(deserialize_with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run1_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run2_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run3_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run4_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub event_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub cancelled: bool,
}

impl Event {
    pub fn key(&self) -> Option<EventKey> {
        EventKey::new(&self.codex, self.date)
    }

    pub fn gender(&self) -> Option<Gender> {
        Gender::parse(&self.gender)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventResult {
    #[serde(deserialize_with = "lenient_string")]
    pub fis_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub athlete_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bib: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run1: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run2: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run3: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub run4: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub total_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub diff_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub fis_points: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub points_2027: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub cup_points: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
}

impl EventResult {
    /// Finished rows carry no status or the literal "Finished".
    pub fn is_finished(&self) -> bool {
        match self.status.as_deref() {
            None => true,
            Some(status) => status == "Finished",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparedAthlete {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SideResult {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub total_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub diff_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub bib: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SharedRace {
    #[serde(deserialize_with = "lenient_string")]
    pub event_codex: String,
    #[serde(deserialize_with = "iso_date")]
    pub event_date: NaiveDate,
    #[serde(default)]
    pub location: EventLocation,
    #[serde(default, deserialize_with = "lenient_string")]
    pub discipline: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default)]
    pub athlete1_result: Option<SideResult>,
    #[serde(default)]
    pub athlete2_result: Option<SideResult>,
}

impl SharedRace {
    pub fn event_key(&self) -> Option<EventKey> {
        EventKey::new(&self.event_codex, self.event_date)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ComparisonPayload {
    #[serde(default)]
    pub athlete1_details: Option<ComparedAthlete>,
    #[serde(default)]
    pub athlete2_details: Option<ComparedAthlete>,
    #[serde(default)]
    pub races: Vec<SharedRace>,
}

pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "null" {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
        _ => false,
    })
}

fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    Ok(lenient_opt_string(deserializer)?.and_then(|raw| Gender::parse(&raw)))
}

fn iso_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = lenient_string(deserializer)?;
    parse_iso_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_parses_place_and_code() {
        let loc = EventLocation::parse("Val d'Isere (FRA)");
        assert_eq!(loc.place, "Val d'Isere");
        assert_eq!(loc.country, "FRA");

        let loc = EventLocation::parse("Copper Mountain");
        assert_eq!(loc.place, "Copper Mountain");
        assert!(loc.country.is_empty());
    }

    #[test]
    fn event_key_rejects_hyphenated_codex() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 26).expect("valid date");
        assert!(EventKey::new("00-1", date).is_none());
        assert!(EventKey::new("", date).is_none());
        assert_eq!(
            EventKey::new("0001", date).map(|k| k.date_string()),
            Some("2025-10-26".to_string())
        );
    }

    #[test]
    fn points_accept_string_forms() {
        assert_eq!(Points::parse("12.5").value(), Some(12.5));
        assert!(!Points::parse("9999").is_available());
        assert!(!Points::parse("null").is_available());
        assert_eq!(Points::parse("0").value(), Some(0.0));
    }
}
