use skirank_terminal::backend::{Backend, BackendError};
use skirank_terminal::demo_backend::{DEMO_EMAIL, DEMO_PASSWORD, DemoBackend};
use skirank_terminal::favorites::{FavoriteChange, FavoritesStore};
use skirank_terminal::provider::favorite_athletes;

fn signed_in(backend: &DemoBackend) -> FavoritesStore {
    let session = backend
        .sign_in(DEMO_EMAIL, DEMO_PASSWORD)
        .expect("demo credentials should sign in");
    let mut store = FavoritesStore::new();
    store
        .start_session(backend, session)
        .expect("favorites should load");
    store
}

#[test]
fn add_puts_newest_first_and_toggle_removes() {
    let backend = DemoBackend::new();
    let mut store = signed_in(&backend);
    assert!(store.codes().is_empty());

    store.add(&backend, "6190001").expect("add");
    store.add(&backend, "6290003").expect("add");
    assert_eq!(store.codes(), &["6290003".to_string(), "6190001".to_string()]);

    let change = store.toggle(&backend, "6190001").expect("toggle");
    assert_eq!(change, FavoriteChange::Removed);
    assert!(!store.is_favorite("6190001"));

    // The backend agrees with the local set.
    store.reload(&backend).expect("reload");
    assert_eq!(store.codes(), &["6290003".to_string()]);
}

#[test]
fn duplicate_insert_is_a_conflict_and_leaves_set_alone() {
    let backend = DemoBackend::new();
    let mut store = signed_in(&backend);
    let session = store.session().cloned().expect("session");

    backend
        .insert_favorite(&session, "6190002")
        .expect("direct insert");
    let err = store.add(&backend, "6190002").expect_err("second insert");
    assert!(err.is_conflict());
    assert!(store.codes().is_empty());
}

#[test]
fn signed_out_mutations_are_unauthenticated() {
    let backend = DemoBackend::new();
    let mut store = FavoritesStore::new();
    assert_eq!(
        store.add(&backend, "6190001"),
        Err(BackendError::Unauthenticated)
    );
    assert_eq!(
        store.toggle(&backend, "6190001"),
        Err(BackendError::Unauthenticated)
    );

    let mut store = signed_in(&backend);
    store.add(&backend, "6190001").expect("add");
    store.end_session();
    assert!(!store.is_signed_in());
    assert!(store.codes().is_empty());
}

#[test]
fn new_session_replaces_previous_users_set() {
    let backend = DemoBackend::new();
    let mut store = signed_in(&backend);
    store.add(&backend, "6190001").expect("add");

    let outcome = backend
        .sign_up("second@skirank.app", "downhill")
        .expect("sign up");
    let skirank_terminal::auth::SignUpOutcome::SignedIn(session) = outcome else {
        panic!("demo sign up signs in directly");
    };
    store.start_session(&backend, session).expect("load");
    assert!(store.codes().is_empty());
}

#[test]
fn favorite_athletes_follow_favorites_order() {
    let backend = DemoBackend::new();
    let codes = vec![
        "6290002".to_string(),
        "6190004".to_string(),
        "9999999".to_string(),
        "6190001".to_string(),
    ];
    let rows = favorite_athletes(&backend, &codes).expect("lookup");
    let names: Vec<&str> = rows.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["MEIER Lena", "STEINER Jakob", "ROSSI Marco"]);

    assert!(favorite_athletes(&backend, &[]).expect("empty").is_empty());
}

#[test]
fn wrong_password_keeps_the_server_message() {
    let backend = DemoBackend::new();
    let err = backend
        .sign_in(DEMO_EMAIL, "wrong-pass")
        .expect_err("bad password");
    assert!(matches!(
        err,
        BackendError::Remote { status: 400, ref message } if message == "Invalid login credentials"
    ));
}
