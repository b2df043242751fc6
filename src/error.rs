use thiserror::Error;

use crate::models::Gender;

/// Failure at the remote boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("backend error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("not found")]
    NotFound,

    #[error("duplicate record: {0}")]
    Conflict(String),

    #[error("not signed in")]
    Unauthenticated,

    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::Conflict(_))
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

/// Input rejected before any remote call. Shown inline, never logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Per favore, inserisci due FIS code validi.")]
    MissingComparisonCode,

    #[error("Inserisci due FIS code diversi.")]
    IdenticalComparisonCodes,

    #[error("Inserisci un indirizzo email.")]
    MissingEmail,

    #[error("La password deve contenere almeno {min} caratteri.")]
    PasswordTooShort { min: usize },

    #[error("Le password non coincidono.")]
    PasswordMismatch,

    #[error("L'atleta cercato è {}. Non puoi filtrare per un genere diverso.", .0.singular_label())]
    GenderLocked(Gender),
}
