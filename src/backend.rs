use serde::Serialize;

use crate::auth::{Session, SignUpOutcome};
use crate::calendar::DateWindow;
use crate::models::{
    Athlete, AthleteProfile, AthleteResult, ComparisonPayload, Discipline, Event, EventKey,
    EventResult, Gender,
};

pub use crate::error::BackendError;

pub type BackendResult<T> = Result<T, BackendError>;

/// Offset/limit pair for one page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

/// Parameters of the filtered athlete search. Only populated fields are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AthleteSearch {
    #[serde(rename = "p_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "p_fis_code", skip_serializing_if = "Option::is_none")]
    pub fis_code: Option<String>,
    #[serde(rename = "p_age_min", skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    #[serde(rename = "p_age_max", skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,
    #[serde(rename = "p_country", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "p_gender", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "p_disciplines", skip_serializing_if = "Option::is_none")]
    pub disciplines: Option<Vec<String>>,
}

/// Which athlete procedure a list request goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AthleteQuery {
    Alphabetical,
    Filtered(AthleteSearch),
}

/// Server-side part of the event calendar filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub gender: Option<Gender>,
    pub disciplines: Vec<Discipline>,
    pub window: DateWindow,
}

/// The remote data and auth service.
pub trait Backend: Send + Sync {
    fn ranked_athletes(&self, gender: Gender, page: PageWindow) -> BackendResult<Vec<Athlete>>;

    fn athletes(&self, query: &AthleteQuery, page: PageWindow) -> BackendResult<Vec<Athlete>>;

    /// Free-text match on name or FIS code, used by the favorites picker.
    fn quick_search(&self, text: &str, limit: usize) -> BackendResult<Vec<Athlete>>;

    fn athletes_by_codes(&self, codes: &[String]) -> BackendResult<Vec<Athlete>>;

    fn athlete_details(&self, fis_code: &str) -> BackendResult<Option<AthleteProfile>>;

    fn last_ten_results(&self, fis_code: &str) -> BackendResult<Vec<AthleteResult>>;

    fn events(&self, query: &EventQuery, page: PageWindow) -> BackendResult<Vec<Event>>;

    fn event_details(&self, key: &EventKey) -> BackendResult<Option<Event>>;

    fn event_results(&self, key: &EventKey) -> BackendResult<Vec<EventResult>>;

    fn compare_athletes(&self, first: &str, second: &str) -> BackendResult<ComparisonPayload>;

    /// Favorite codes for the session's user, most recently added first.
    fn favorite_codes(&self, session: &Session) -> BackendResult<Vec<String>>;

    fn insert_favorite(&self, session: &Session, fis_code: &str) -> BackendResult<()>;

    fn delete_favorite(&self, session: &Session, fis_code: &str) -> BackendResult<()>;

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session>;

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome>;

    fn sign_out(&self, session: &Session) -> BackendResult<()>;

    /// Re-validates a stored session against the auth service.
    fn current_user(&self, session: &Session) -> BackendResult<Session>;

    fn oauth_url(&self, provider: &str, redirect: Option<&str>) -> String;
}
