use crate::auth::Session;
use crate::backend::{Backend, BackendError, BackendResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

/// Favorite athlete codes of the signed-in user, newest first.
///
/// Scoped to one session: `start_session` replaces the set, `end_session`
/// drops it. Mutations hit the backend first and only touch the local set
/// once the backend has confirmed.
#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    session: Option<Session>,
    codes: Vec<String>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn is_favorite(&self, fis_code: &str) -> bool {
        self.codes.iter().any(|c| c == fis_code)
    }

    /// Clears the set and loads the new user's favorites.
    pub fn start_session(&mut self, backend: &dyn Backend, session: Session) -> BackendResult<()> {
        self.session = Some(session);
        self.codes.clear();
        self.reload(backend)
    }

    pub fn end_session(&mut self) {
        self.session = None;
        self.codes.clear();
    }

    pub fn reload(&mut self, backend: &dyn Backend) -> BackendResult<()> {
        let session = self.session.as_ref().ok_or(BackendError::Unauthenticated)?;
        self.codes = backend.favorite_codes(session)?;
        Ok(())
    }

    pub fn add(&mut self, backend: &dyn Backend, fis_code: &str) -> BackendResult<()> {
        let session = self.session.as_ref().ok_or(BackendError::Unauthenticated)?;
        backend.insert_favorite(session, fis_code)?;
        if !self.is_favorite(fis_code) {
            self.codes.insert(0, fis_code.to_string());
        }
        Ok(())
    }

    pub fn remove(&mut self, backend: &dyn Backend, fis_code: &str) -> BackendResult<()> {
        let session = self.session.as_ref().ok_or(BackendError::Unauthenticated)?;
        backend.delete_favorite(session, fis_code)?;
        self.codes.retain(|c| c != fis_code);
        Ok(())
    }

    pub fn toggle(&mut self, backend: &dyn Backend, fis_code: &str) -> BackendResult<FavoriteChange> {
        if self.is_favorite(fis_code) {
            self.remove(backend, fis_code).map(|()| FavoriteChange::Removed)
        } else {
            self.add(backend, fis_code).map(|()| FavoriteChange::Added)
        }
    }
}
