use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::Session;
use crate::state::{AppState, Theme};

const PREFS_DIR: &str = "skirank_terminal";
const PREFS_FILE: &str = "prefs.json";
const SESSION_FILE: &str = "session.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefs {
    pub version: u32,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub last_route: Option<String>,
}

impl Prefs {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            version: PREFS_VERSION,
            theme: state.theme,
            last_route: Some(state.router.fragment().to_string()),
        }
    }
}

/// Saved preferences, or `None` when missing, unreadable or from another version.
pub fn load() -> Option<Prefs> {
    load_from(&prefs_path()?)
}

pub fn load_from(path: &Path) -> Option<Prefs> {
    let raw = fs::read_to_string(path).ok()?;
    let prefs = serde_json::from_str::<Prefs>(&raw).ok()?;
    (prefs.version == PREFS_VERSION).then_some(prefs)
}

pub fn save_from_state(state: &AppState) {
    let Some(path) = prefs_path() else {
        return;
    };
    save_to(&path, &Prefs::from_state(state));
}

pub fn save_to(path: &Path, prefs: &Prefs) {
    write_json(path, prefs);
}

/// Session kept from the last run, tokens included.
pub fn load_session() -> Option<Session> {
    load_session_from(&config_dir()?.join(SESSION_FILE))
}

pub fn load_session_from(path: &Path) -> Option<Session> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Writes the session, or removes the file when signed out.
pub fn save_session(session: Option<&Session>) {
    let Some(dir) = config_dir() else {
        return;
    };
    save_session_to(&dir.join(SESSION_FILE), session);
}

pub fn save_session_to(path: &Path, session: Option<&Session>) {
    match session {
        Some(session) => write_json(path, session),
        None => {
            let _ = fs::remove_file(path);
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) {
    let Some(dir) = path.parent() else {
        return;
    };
    if fs::create_dir_all(dir).is_err() {
        return;
    }
    if let Ok(json) = serde_json::to_string_pretty(value) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, path);
        }
    }
}

fn prefs_path() -> Option<PathBuf> {
    Some(config_dir()?.join(PREFS_FILE))
}

fn config_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CONFIG_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(PREFS_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".config").join(PREFS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_keeps_theme_and_route() {
        let dir = std::env::temp_dir().join(format!("skirank-prefs-{}", std::process::id()));
        let path = dir.join(PREFS_FILE);
        let prefs = Prefs {
            version: PREFS_VERSION,
            theme: Theme::Light,
            last_route: Some("gare".to_string()),
        };
        save_to(&path, &prefs);
        assert_eq!(load_from(&path), Some(prefs));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn session_file_is_written_and_removed() {
        let dir = std::env::temp_dir().join(format!("skirank-session-{}", std::process::id()));
        let path = dir.join(SESSION_FILE);
        let session = Session {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            user: crate::auth::User {
                id: "u1".to_string(),
                email: Some("a@b.it".to_string()),
            },
        };
        save_session_to(&path, Some(&session));
        assert_eq!(load_session_from(&path), Some(session));

        save_session_to(&path, None);
        assert!(!path.exists());
        assert_eq!(load_session_from(&path), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn other_versions_are_ignored() {
        let dir = std::env::temp_dir().join(format!("skirank-prefs-old-{}", std::process::id()));
        let path = dir.join(PREFS_FILE);
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(&path, r#"{"version":0,"theme":"light"}"#).expect("write");
        assert_eq!(load_from(&path), None);
        let _ = fs::remove_dir_all(&dir);
    }
}
