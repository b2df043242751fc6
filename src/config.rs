use std::env;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::router::{self, NavigationState};

pub const DEFAULT_RANK_PAGE_SIZE: usize = 50;
pub const DEFAULT_ATHLETES_PAGE_SIZE: usize = 25;
pub const DEFAULT_EVENTS_PAGE_SIZE: usize = 100;
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const FAVORITES_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    Supabase { url: String, anon_key: String },
    Demo,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub rank_page_size: usize,
    pub athletes_page_size: usize,
    pub events_page_size: usize,
    pub search_debounce: Duration,
    pub oauth_provider: String,
    pub oauth_redirect: Option<String>,
    pub start_route: Option<String>,
    /// Lines for the console, emitted once the UI is up.
    pub notes: Vec<String>,
}

impl Config {
    /// Loads `.env.local` and `.env` (both optional) and reads the process
    /// environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut notes = Vec::new();

        let url = get("SUPABASE_URL").or_else(|| get("VITE_SUPABASE_URL"));
        let anon_key = get("SUPABASE_ANON_KEY").or_else(|| get("VITE_SUPABASE_ANON_KEY"));
        let requested = get("SKIRANK_BACKEND").map(|v| v.to_lowercase());

        let backend = match (requested.as_deref(), url, anon_key) {
            (Some("demo"), _, _) => BackendKind::Demo,
            (Some("supabase") | None, Some(url), Some(anon_key)) => BackendKind::Supabase {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            },
            (Some("supabase"), _, _) => {
                bail!("SKIRANK_BACKEND=supabase needs SUPABASE_URL and SUPABASE_ANON_KEY")
            }
            (None, _, _) => {
                notes.push(
                    "[WARN] SUPABASE_URL/SUPABASE_ANON_KEY not set, using demo data".to_string(),
                );
                BackendKind::Demo
            }
            (Some(other), _, _) => bail!("unknown SKIRANK_BACKEND value: {other}"),
        };

        let size = |key: &str, default: usize| {
            get(key)
                .and_then(|val| val.parse::<usize>().ok())
                .unwrap_or(default)
                .clamp(1, 500)
        };

        Ok(Self {
            backend,
            rank_page_size: size("SKIRANK_RANK_PAGE_SIZE", DEFAULT_RANK_PAGE_SIZE),
            athletes_page_size: size("SKIRANK_ATHLETES_PAGE_SIZE", DEFAULT_ATHLETES_PAGE_SIZE),
            events_page_size: size("SKIRANK_EVENTS_PAGE_SIZE", DEFAULT_EVENTS_PAGE_SIZE),
            search_debounce: Duration::from_millis(
                get("SKIRANK_SEARCH_DEBOUNCE_MS")
                    .and_then(|val| val.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_DEBOUNCE_MS)
                    .min(5_000),
            ),
            oauth_provider: get("SKIRANK_OAUTH_PROVIDER").unwrap_or_else(|| "google".to_string()),
            oauth_redirect: get("SKIRANK_OAUTH_REDIRECT"),
            start_route: get("SKIRANK_ROUTE"),
            notes,
        })
    }
}

/// Command-line fragment, then `SKIRANK_ROUTE`, then the saved route, then root.
pub fn initial_route(
    cli_fragment: Option<&str>,
    config: &Config,
    saved_route: Option<&str>,
) -> NavigationState {
    cli_fragment
        .or(config.start_route.as_deref())
        .or(saved_route)
        .map(router::decode)
        .unwrap_or_default()
}
