use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::auth::{AuthRequest, Session, SignUpOutcome};
use crate::backend::{Backend, BackendError, BackendResult};
use crate::comparison;
use crate::config::{Config, FAVORITES_SEARCH_LIMIT};
use crate::detail;
use crate::favorites::FavoritesStore;
use crate::models::Athlete;
use crate::state::{Delta, ProviderCommand};

const CONFIRMATION_SENT: &str =
    "Registrazione completata! Controlla la tua email per confermare l'account.";

/// Backend worker. Reads run on their own threads so a slow call never
/// blocks the next command; favorites and auth mutations run in order on
/// this thread because they share the session.
pub fn spawn_provider(
    backend: Arc<dyn Backend>,
    config: Config,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) {
    thread::spawn(move || {
        let mut store = FavoritesStore::new();
        for cmd in cmd_rx {
            handle_command(&backend, &config, &mut store, &tx, cmd);
        }
    });
}

fn handle_command(
    backend: &Arc<dyn Backend>,
    config: &Config,
    store: &mut FavoritesStore,
    tx: &Sender<Delta>,
    cmd: ProviderCommand,
) {
    match cmd {
        ProviderCommand::FetchRanked {
            ticket,
            gender,
            window,
        } => spawn_fetch(backend, tx, move |backend| Delta::RankedPage {
            ticket,
            result: backend.ranked_athletes(gender, window),
        }),
        ProviderCommand::FetchAthletes {
            ticket,
            query,
            window,
        } => spawn_fetch(backend, tx, move |backend| Delta::AthletesPage {
            ticket,
            result: backend.athletes(&query, window),
        }),
        ProviderCommand::FetchEvents {
            ticket,
            query,
            window,
        } => spawn_fetch(backend, tx, move |backend| Delta::EventsPage {
            ticket,
            result: backend.events(&query, window),
        }),
        ProviderCommand::FetchAthleteDetail { ticket, fis_code } => {
            spawn_fetch(backend, tx, move |backend| Delta::AthleteDetail {
                ticket,
                outcome: detail::fetch_athlete(backend, &fis_code),
            })
        }
        ProviderCommand::FetchEventDetail { ticket, key } => {
            spawn_fetch(backend, tx, move |backend| Delta::EventDetail {
                ticket,
                outcome: detail::fetch_event(backend, &key),
            })
        }
        ProviderCommand::Compare {
            ticket,
            first,
            second,
        } => spawn_fetch(backend, tx, move |backend| {
            let payload = backend.compare_athletes(&first, &second);
            Delta::Comparison {
                ticket,
                outcome: comparison::resolve(&first, &second, payload),
            }
        }),
        ProviderCommand::FetchFavoriteAthletes { ticket } => {
            let codes = store.codes().to_vec();
            spawn_fetch(backend, tx, move |backend| Delta::FavoriteAthletes {
                ticket,
                result: favorite_athletes(backend, &codes),
            })
        }
        ProviderCommand::SearchFavorites { ticket, text } => {
            spawn_fetch(backend, tx, move |backend| Delta::FavoritesSearch {
                ticket,
                result: backend.quick_search(&text, FAVORITES_SEARCH_LIMIT),
            })
        }
        ProviderCommand::ToggleFavorite { fis_code } => {
            let result = store.toggle(backend.as_ref(), &fis_code);
            let changed = result.is_ok();
            let _ = tx.send(Delta::FavoriteToggled { fis_code, result });
            if changed {
                let _ = tx.send(Delta::Favorites(store.codes().to_vec()));
            }
        }
        ProviderCommand::AddFavorite { fis_code } => {
            let result = store.add(backend.as_ref(), &fis_code);
            let changed = result.is_ok();
            let _ = tx.send(Delta::FavoriteAdded { fis_code, result });
            if changed {
                let _ = tx.send(Delta::Favorites(store.codes().to_vec()));
            }
        }
        ProviderCommand::Authenticate(request) => {
            let outcome = match request {
                AuthRequest::SignIn { email, password } => backend
                    .sign_in(&email, &password)
                    .map(SignUpOutcome::SignedIn),
                AuthRequest::SignUp { email, password } => backend.sign_up(&email, &password),
            };
            match outcome {
                Ok(SignUpOutcome::SignedIn(session)) => {
                    start_session(backend.as_ref(), store, tx, session)
                }
                Ok(SignUpOutcome::ConfirmationSent) => {
                    let _ = tx.send(Delta::AuthNotice(CONFIRMATION_SENT.to_string()));
                }
                Err(err) => {
                    let _ = tx.send(Delta::AuthFailed(auth_message(&err)));
                }
            }
        }
        ProviderCommand::RestoreSession(saved) => {
            if store.is_signed_in() {
                return;
            }
            match backend.current_user(&saved) {
                Ok(session) => start_session(backend.as_ref(), store, tx, session),
                Err(BackendError::Unauthenticated) => {
                    let _ = tx.send(Delta::Log("[INFO] Saved session expired".to_string()));
                    let _ = tx.send(Delta::SessionChanged(None));
                }
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Session restore failed: {err}")));
                }
            }
        }
        ProviderCommand::SignOut => {
            if let Some(session) = store.session()
                && let Err(err) = backend.sign_out(session)
            {
                let _ = tx.send(Delta::Log(format!("[WARN] Sign out error: {err}")));
            }
            store.end_session();
            let _ = tx.send(Delta::SessionChanged(None));
        }
        ProviderCommand::OAuthUrl => {
            let url = backend.oauth_url(&config.oauth_provider, config.oauth_redirect.as_deref());
            let _ = tx.send(Delta::OAuthUrl(url));
        }
    }
}

fn spawn_fetch<F>(backend: &Arc<dyn Backend>, tx: &Sender<Delta>, job: F)
where
    F: FnOnce(&dyn Backend) -> Delta + Send + 'static,
{
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    thread::spawn(move || {
        let _ = tx.send(job(backend.as_ref()));
    });
}

fn start_session(
    backend: &dyn Backend,
    store: &mut FavoritesStore,
    tx: &Sender<Delta>,
    session: Session,
) {
    if let Err(err) = store.start_session(backend, session.clone()) {
        let _ = tx.send(Delta::Log(format!("[WARN] Favorites load error: {err}")));
    }
    let _ = tx.send(Delta::SessionChanged(Some(session)));
    let _ = tx.send(Delta::Favorites(store.codes().to_vec()));
}

/// Favorite athletes in favorites order (most recent first).
pub fn favorite_athletes(backend: &dyn Backend, codes: &[String]) -> BackendResult<Vec<Athlete>> {
    if codes.is_empty() {
        return Ok(Vec::new());
    }
    let mut rows = backend.athletes_by_codes(codes)?;
    let mut ordered = Vec::with_capacity(rows.len());
    for code in codes {
        if let Some(pos) = rows.iter().position(|a| &a.fis_code == code) {
            ordered.push(rows.swap_remove(pos));
        }
    }
    Ok(ordered)
}

fn auth_message(err: &BackendError) -> String {
    match err {
        BackendError::Remote { message, .. } if !message.is_empty() => message.clone(),
        other => other.to_string(),
    }
}
