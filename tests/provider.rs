use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use skirank_terminal::auth::Session;
use skirank_terminal::backend::Backend;
use skirank_terminal::config::Config;
use skirank_terminal::demo_backend::{DEMO_EMAIL, DEMO_PASSWORD, DemoBackend};
use skirank_terminal::provider::spawn_provider;
use skirank_terminal::state::{Delta, ProviderCommand};

fn start(backend: Arc<DemoBackend>) -> (Sender<ProviderCommand>, Receiver<Delta>) {
    let config = Config::from_lookup(|_| None).expect("demo config");
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(backend, config, tx, cmd_rx);
    (cmd_tx, rx)
}

fn next_non_log(rx: &Receiver<Delta>) -> Delta {
    loop {
        match rx.recv_timeout(Duration::from_secs(5)).expect("provider answer") {
            Delta::Log(_) => continue,
            delta => return delta,
        }
    }
}

#[test]
fn saved_session_is_restored_with_favorites() {
    let backend = Arc::new(DemoBackend::new());
    let saved = backend
        .sign_in(DEMO_EMAIL, DEMO_PASSWORD)
        .expect("demo credentials should sign in");
    backend
        .insert_favorite(&saved, "6190001")
        .expect("direct insert");

    let (cmd_tx, rx) = start(Arc::clone(&backend));
    cmd_tx
        .send(ProviderCommand::RestoreSession(saved.clone()))
        .expect("send");

    match next_non_log(&rx) {
        Delta::SessionChanged(Some(session)) => {
            assert_eq!(session.user.id, saved.user.id);
            assert_eq!(session.label(), DEMO_EMAIL);
        }
        other => panic!("expected a restored session, got {other:?}"),
    }
    match next_non_log(&rx) {
        Delta::Favorites(codes) => assert_eq!(codes, ["6190001".to_string()]),
        other => panic!("expected favorites, got {other:?}"),
    }
}

#[test]
fn unknown_token_clears_the_saved_session() {
    let backend = Arc::new(DemoBackend::new());
    let mut saved: Session = backend
        .sign_in(DEMO_EMAIL, DEMO_PASSWORD)
        .expect("demo credentials should sign in");
    saved.access_token = "revoked".to_string();

    let (cmd_tx, rx) = start(backend);
    cmd_tx
        .send(ProviderCommand::RestoreSession(saved))
        .expect("send");

    assert!(matches!(next_non_log(&rx), Delta::SessionChanged(None)));
}
