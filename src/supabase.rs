use anyhow::{Context, Result};
use reqwest::Url;
use reqwest::blocking::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::auth::{Session, SignUpOutcome, User};
use crate::backend::{
    AthleteQuery, Backend, BackendError, BackendResult, EventQuery, PageWindow,
};
use crate::http_client::http_client;
use crate::models::{
    Athlete, AthleteProfile, AthleteResult, ComparisonPayload, Event, EventKey, EventResult,
    Gender,
};

const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST + GoTrue client for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    base_url: String,
    anon_key: String,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{path}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn send(&self, request: RequestBuilder, token: Option<&str>) -> BackendResult<String> {
        let response: Response = self.authorize(request, token).send()?;
        let status = response.status();
        let body = response.text()?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(status.as_u16(), &body))
        }
    }

    fn rpc(&self, name: &str, args: &Value) -> BackendResult<String> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client.post(self.rest_url(&format!("rpc/{name}"))).json(args);
        self.send(request, None)
    }

    fn get(
        &self,
        table: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> BackendResult<String> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client.get(self.rest_url(table)).query(query);
        self.send(request, token)
    }
}

fn decode<T>(parsed: Result<T>) -> BackendResult<T> {
    parsed.map_err(|err| BackendError::Decode(format!("{err:#}")))
}

fn page_args(page: PageWindow) -> (usize, usize) {
    (page.limit, page.offset)
}

impl Backend for SupabaseBackend {
    fn ranked_athletes(&self, gender: Gender, page: PageWindow) -> BackendResult<Vec<Athlete>> {
        let (limit, offset) = page_args(page);
        let body = self.rpc(
            "get_ranked_athletes",
            &json!({
                "gender_filter": gender.athlete_value(),
                "limit_count": limit,
                "offset_count": offset,
            }),
        )?;
        decode(parse_athletes_json(&body))
    }

    fn athletes(&self, query: &AthleteQuery, page: PageWindow) -> BackendResult<Vec<Athlete>> {
        let (limit, offset) = page_args(page);
        let body = match query {
            AthleteQuery::Alphabetical => self.rpc(
                "get_athletes_alphabetical",
                &json!({ "limit_count": limit, "offset_count": offset }),
            )?,
            AthleteQuery::Filtered(search) => {
                let mut args = serde_json::to_value(search)?;
                if let Value::Object(map) = &mut args {
                    map.insert("p_limit".to_string(), json!(limit));
                    map.insert("p_offset".to_string(), json!(offset));
                }
                self.rpc("search_athletes_with_filters", &args)?
            }
        };
        decode(parse_athletes_json(&body))
    }

    fn quick_search(&self, text: &str, limit: usize) -> BackendResult<Vec<Athlete>> {
        let needle = sanitize_like(text);
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let body = self.get(
            "athletes",
            &[
                ("select", "*".to_string()),
                (
                    "or",
                    format!("(name.ilike.*{needle}*,fis_code.ilike.*{needle}*)"),
                ),
                ("limit", limit.to_string()),
            ],
            None,
        )?;
        decode(parse_athletes_json(&body))
    }

    fn athletes_by_codes(&self, codes: &[String]) -> BackendResult<Vec<Athlete>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let body = self.get(
            "athletes",
            &[
                ("select", "*".to_string()),
                ("fis_code", in_filter(codes.iter().map(String::as_str))),
            ],
            None,
        )?;
        decode(parse_athletes_json(&body))
    }

    fn athlete_details(&self, fis_code: &str) -> BackendResult<Option<AthleteProfile>> {
        let body = self.rpc("get_athlete_details", &json!({ "fis_code_filter": fis_code }))?;
        decode(parse_athlete_profile_json(&body))
    }

    fn last_ten_results(&self, fis_code: &str) -> BackendResult<Vec<AthleteResult>> {
        let body = self.rpc("get_last_ten_results", &json!({ "fis_code_filter": fis_code }))?;
        decode(parse_athlete_results_json(&body))
    }

    fn events(&self, query: &EventQuery, page: PageWindow) -> BackendResult<Vec<Event>> {
        let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];
        if let Some(gender) = query.gender {
            params.push(("gender", format!("eq.{}", gender.event_value())));
        }
        if !query.disciplines.is_empty() {
            params.push((
                "discipline",
                in_filter(query.disciplines.iter().map(|d| d.full_name())),
            ));
        }
        let window = query.window;
        if window.is_single_day() {
            params.push(("date", format!("eq.{}", window.start.format("%Y-%m-%d"))));
        } else {
            params.push(("date", format!("gte.{}", window.start.format("%Y-%m-%d"))));
            params.push(("date", format!("lte.{}", window.end.format("%Y-%m-%d"))));
        }
        params.push(("order", "date.asc,discipline.asc".to_string()));
        params.push(("limit", page.limit.to_string()));
        params.push(("offset", page.offset.to_string()));
        let body = self.get("events", &params, None)?;
        decode(parse_events_json(&body))
    }

    fn event_details(&self, key: &EventKey) -> BackendResult<Option<Event>> {
        let body = self.rpc(
            "get_event_details",
            &json!({ "p_codex": key.codex(), "p_date": key.date_string() }),
        )?;
        decode(parse_event_json(&body))
    }

    fn event_results(&self, key: &EventKey) -> BackendResult<Vec<EventResult>> {
        let body = self.rpc(
            "get_event_results",
            &json!({ "p_codex": key.codex(), "p_date": key.date_string() }),
        )?;
        decode(parse_event_results_json(&body))
    }

    fn compare_athletes(&self, first: &str, second: &str) -> BackendResult<ComparisonPayload> {
        let body = self.rpc(
            "compare_athletes_detailed",
            &json!({ "fis_code_1": first, "fis_code_2": second }),
        )?;
        decode(parse_comparison_json(&body))
    }

    fn favorite_codes(&self, session: &Session) -> BackendResult<Vec<String>> {
        let body = self.get(
            "favorite_athletes",
            &[
                ("select", "fis_code".to_string()),
                ("user_id", format!("eq.{}", session.user_id())),
                ("order", "created_at.desc".to_string()),
            ],
            Some(&session.access_token),
        )?;
        decode(parse_favorite_codes_json(&body))
    }

    fn insert_favorite(&self, session: &Session, fis_code: &str) -> BackendResult<()> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client
            .post(self.rest_url("favorite_athletes"))
            .header("Prefer", "return=minimal")
            .json(&json!({ "fis_code": fis_code, "user_id": session.user_id() }));
        self.send(request, Some(&session.access_token)).map(|_| ())
    }

    fn delete_favorite(&self, session: &Session, fis_code: &str) -> BackendResult<()> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client.delete(self.rest_url("favorite_athletes")).query(&[
            ("fis_code", format!("eq.{fis_code}")),
            ("user_id", format!("eq.{}", session.user_id())),
        ]);
        self.send(request, Some(&session.access_token)).map(|_| ())
    }

    fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body = self.send(request, None)?;
        decode(parse_session_json(&body))
    }

    fn sign_up(&self, email: &str, password: &str) -> BackendResult<SignUpOutcome> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let body = self.send(request, None)?;
        decode(parse_signup_json(&body))
    }

    fn sign_out(&self, session: &Session) -> BackendResult<()> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client.post(self.auth_url("logout"));
        self.send(request, Some(&session.access_token)).map(|_| ())
    }

    fn current_user(&self, session: &Session) -> BackendResult<Session> {
        let client = http_client().map_err(|err| BackendError::Transport(format!("{err:#}")))?;
        let request = client.get(self.auth_url("user"));
        let body = self.send(request, Some(&session.access_token))?;
        let user = decode(parse_user_json(&body))?;
        Ok(Session {
            user,
            ..session.clone()
        })
    }

    fn oauth_url(&self, provider: &str, redirect: Option<&str>) -> String {
        let base = self.auth_url("authorize");
        let mut params = vec![("provider", provider)];
        if let Some(redirect) = redirect {
            params.push(("redirect_to", redirect));
        }
        Url::parse_with_params(&base, &params)
            .map(|url| url.to_string())
            .unwrap_or(base)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Maps an error response to the error taxonomy. Duplicate keys come back as
/// Postgres code 23505 or HTTP 409.
pub fn classify_error(status: u16, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = match &parsed.code {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    let message = parsed
        .message
        .or(parsed.msg)
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string());

    if code.as_deref() == Some(UNIQUE_VIOLATION) || status == 409 {
        return BackendError::Conflict(message);
    }
    if status == 401 {
        return BackendError::Unauthenticated;
    }
    BackendError::Remote { status, message }
}

// `,` `(` `)` are structural in PostgREST filter expressions.
fn sanitize_like(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"'))
        .collect()
}

fn in_filter<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values
        .map(|v| format!("\"{}\"", v.replace('"', "")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn parse_rows<T: DeserializeOwned>(raw: &str, what: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(trimmed).with_context(|| format!("invalid {what} json"))?;
    match value {
        Value::Array(_) => {
            serde_json::from_value(value).with_context(|| format!("invalid {what} rows"))
        }
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![
            serde_json::from_value(other).with_context(|| format!("invalid {what} row"))?,
        ]),
    }
}

// Procedures returning one record come back as an object or a 0/1-row array.
fn parse_single<T: DeserializeOwned>(raw: &str, what: &str) -> Result<Option<T>> {
    Ok(parse_rows::<T>(raw, what)?.into_iter().next())
}

pub fn parse_athletes_json(raw: &str) -> Result<Vec<Athlete>> {
    parse_rows(raw, "athletes")
}

pub fn parse_athlete_profile_json(raw: &str) -> Result<Option<AthleteProfile>> {
    parse_single(raw, "athlete details")
}

pub fn parse_athlete_results_json(raw: &str) -> Result<Vec<AthleteResult>> {
    parse_rows(raw, "athlete results")
}

pub fn parse_events_json(raw: &str) -> Result<Vec<Event>> {
    parse_rows(raw, "events")
}

pub fn parse_event_json(raw: &str) -> Result<Option<Event>> {
    parse_single(raw, "event details")
}

pub fn parse_event_results_json(raw: &str) -> Result<Vec<EventResult>> {
    parse_rows(raw, "event results")
}

pub fn parse_comparison_json(raw: &str) -> Result<ComparisonPayload> {
    Ok(parse_single(raw, "comparison")?.unwrap_or_default())
}

pub fn parse_favorite_codes_json(raw: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct FavoriteRow {
        fis_code: Value,
    }
    let rows: Vec<FavoriteRow> = parse_rows(raw, "favorites")?;
    Ok(rows
        .into_iter()
        .filter_map(|row| match row.fis_code {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

pub fn parse_session_json(raw: &str) -> Result<Session> {
    serde_json::from_str(raw.trim()).context("invalid session json")
}

pub fn parse_user_json(raw: &str) -> Result<User> {
    serde_json::from_str(raw.trim()).context("invalid user json")
}

/// Sign-up answers with a session when email confirmation is off, and with
/// the bare user otherwise.
pub fn parse_signup_json(raw: &str) -> Result<SignUpOutcome> {
    let value: Value = serde_json::from_str(raw.trim()).context("invalid signup json")?;
    if value.get("access_token").is_some_and(|t| t.is_string()) {
        let session: Session = serde_json::from_value(value).context("invalid signup session")?;
        return Ok(SignUpOutcome::SignedIn(session));
    }
    Ok(SignUpOutcome::ConfirmationSent)
}
