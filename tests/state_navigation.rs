use std::time::{Duration, Instant};

use chrono::NaiveDate;

use skirank_terminal::auth::{Session, User};
use skirank_terminal::backend::{AthleteQuery, BackendError};
use skirank_terminal::demo_backend::DemoBackend;
use skirank_terminal::calendar::ViewMode;
use skirank_terminal::models::{Athlete, Discipline, Gender};
use skirank_terminal::paging::Ticket;
use skirank_terminal::router::{NavigationState, Page};
use skirank_terminal::state::{
    AppState, Delta, EditTarget, LOGIN_REQUIRED, PageSizes, ProviderCommand, apply_delta,
};

const SIZES: PageSizes = PageSizes {
    rank: 3,
    athletes: 3,
    events: 10,
};

fn new_state(page: Page) -> AppState {
    let today = NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date");
    AppState::new(
        NavigationState::Page(page),
        SIZES,
        Duration::from_millis(300),
        today,
    )
}

fn session(email: &str) -> Session {
    Session {
        access_token: "token".to_string(),
        refresh_token: None,
        user: User {
            id: "user-1".to_string(),
            email: Some(email.to_string()),
        },
    }
}

fn athletes_ticket(cmds: &[ProviderCommand]) -> (Ticket, AthleteQuery) {
    match cmds {
        [ProviderCommand::FetchAthletes { ticket, query, .. }] => (*ticket, query.clone()),
        other => panic!("expected one athletes fetch, got {other:?}"),
    }
}

fn ranked_ticket(cmds: &[ProviderCommand]) -> Ticket {
    match cmds {
        [ProviderCommand::FetchRanked { ticket, .. }] => *ticket,
        other => panic!("expected one ranking fetch, got {other:?}"),
    }
}

fn events_ticket(cmds: &[ProviderCommand]) -> Ticket {
    match cmds {
        [ProviderCommand::FetchEvents { ticket, .. }] => *ticket,
        other => panic!("expected one events fetch, got {other:?}"),
    }
}

fn demo_rows(codes: &[&str]) -> Vec<Athlete> {
    let backend = DemoBackend::new();
    codes
        .iter()
        .filter_map(|code| backend.all_athletes().iter().find(|a| a.fis_code == *code))
        .cloned()
        .collect()
}

#[test]
fn back_from_detail_keeps_list_rows_without_refetch() {
    let mut state = new_state(Page::Athletes);
    let (ticket, _) = athletes_ticket(&state.enter_current());
    apply_delta(
        &mut state,
        Delta::AthletesPage {
            ticket,
            result: Ok(demo_rows(&["6190001", "6290001"])),
        },
    );
    state.select_next();
    assert_eq!(state.athletes.selected, 1);

    let cmds = state.activate();
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchAthleteDetail { fis_code, .. }] if fis_code == "6290001"
    ));
    assert_eq!(state.router.fragment(), "athlete-6290001");

    let cmds = state.go_back();
    assert!(cmds.is_empty(), "loaded list must not refetch");
    assert_eq!(state.athletes.list.rows().len(), 2);
    assert_eq!(state.athletes.selected, 1);
    assert!(state.athlete_detail.detail.value().is_none());
}

#[test]
fn back_from_detail_keeps_non_default_filters() {
    let mut state = new_state(Page::Events);
    state.enter_current();
    state.cycle_event_view();
    assert_eq!(state.events.filters.view, ViewMode::Weekly);
    state.step_events(true);
    let ticket = events_ticket(&state.toggle_event_discipline(Discipline::Slalom));
    state.begin_edit(EditTarget::EventCountry);
    state.input = "aut".to_string();
    assert!(state.commit_edit().is_empty(), "country filters client-side");
    let events = DemoBackend::new().all_events().to_vec();
    apply_delta(
        &mut state,
        Delta::EventsPage {
            ticket,
            result: Ok(events),
        },
    );
    let event_filters = state.events.filters.clone();
    assert_eq!(event_filters.country.as_deref(), Some("AUT"));

    state.open_page(Page::Athletes);
    state.begin_edit(EditTarget::AthleteName);
    state.input = "o".to_string();
    state.commit_edit();
    let (ticket, _) = athletes_ticket(&state.toggle_athlete_discipline(Discipline::GiantSlalom));
    let follow_up = apply_delta(
        &mut state,
        Delta::AthletesPage {
            ticket,
            result: Ok(demo_rows(&["6190001", "6290001"])),
        },
    );
    assert!(follow_up.is_empty(), "mixed genders leave the filter alone");
    let athlete_filters = state.athletes.filters.filters().clone();

    assert_eq!(state.activate().len(), 1);
    assert!(state.go_back().is_empty(), "filtered list must not refetch");
    assert_eq!(state.current(), &NavigationState::Page(Page::Athletes));
    assert_eq!(state.athletes.filters.filters(), &athlete_filters);
    assert_eq!(state.athletes.list.rows().len(), 2);

    assert!(state.open_page(Page::Events).is_empty());
    assert_eq!(state.events.filters, event_filters);
}

#[test]
fn stale_page_after_gender_switch_is_dropped() {
    let mut state = new_state(Page::Rank);
    let men = ranked_ticket(&state.enter_current());
    let women = ranked_ticket(&state.toggle_rank_gender());
    assert_eq!(state.rank.gender, Gender::Female);

    apply_delta(
        &mut state,
        Delta::RankedPage {
            ticket: men,
            result: Ok(demo_rows(&["6190002", "6190001"])),
        },
    );
    assert!(state.rank.list.rows().is_empty());
    assert!(state.rank.list.is_loading());

    apply_delta(
        &mut state,
        Delta::RankedPage {
            ticket: women,
            result: Ok(demo_rows(&["6290001"])),
        },
    );
    assert_eq!(state.rank.list.rows()[0].name, "BIANCHI Sofia");
}

#[test]
fn reaching_the_last_row_requests_the_next_page() {
    let mut state = new_state(Page::Rank);
    let ticket = ranked_ticket(&state.enter_current());
    apply_delta(
        &mut state,
        Delta::RankedPage {
            ticket,
            result: Ok(demo_rows(&["6190002", "6190001", "6190003"])),
        },
    );
    assert!(state.select_next().is_empty());
    let cmds = state.select_next();
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchRanked { window, .. }] if window.offset == 3 && window.limit == 3
    ));
}

#[test]
fn single_gender_search_locks_gender_and_refetches() {
    let mut state = new_state(Page::Athletes);
    state.enter_current();
    state.begin_edit(EditTarget::AthleteName);
    state.input = "bianchi".to_string();
    let (ticket, _) = athletes_ticket(&state.commit_edit());

    let follow_up = apply_delta(
        &mut state,
        Delta::AthletesPage {
            ticket,
            result: Ok(demo_rows(&["6290001"])),
        },
    );
    let (_, query) = athletes_ticket(&follow_up);
    let AthleteQuery::Filtered(search) = query else {
        panic!("search query expected");
    };
    assert_eq!(search.gender.as_deref(), Some("Female"));
    assert!(state.logs.iter().any(|l| l.starts_with("[INFO]")));

    let cmds = state.toggle_athlete_gender(Gender::Male);
    assert!(cmds.is_empty());
    assert!(
        state
            .athletes
            .message
            .as_deref()
            .is_some_and(|m| m.contains("donna"))
    );
}

#[test]
fn comparison_validation_sends_nothing() {
    let mut state = new_state(Page::Compare);
    state.compare.first = "6190001".to_string();
    state.compare.second = " 6190001".to_string();
    assert!(state.submit_comparison().is_empty());
    assert!(state.compare.error.is_some());

    state.compare.second = "6190003".to_string();
    let cmds = state.submit_comparison();
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::Compare { first, second, .. }] if first == "6190001" && second == "6190003"
    ));
    assert!(state.compare.error.is_none());
}

#[test]
fn favorite_toggle_needs_a_session() {
    let mut state = new_state(Page::Rank);
    let ticket = ranked_ticket(&state.enter_current());
    apply_delta(
        &mut state,
        Delta::RankedPage {
            ticket,
            result: Ok(demo_rows(&["6190002"])),
        },
    );
    assert!(state.toggle_favorite_focused().is_empty());
    assert_eq!(state.status.as_deref(), Some(LOGIN_REQUIRED));

    apply_delta(&mut state, Delta::SessionChanged(Some(session("demo@skirank.app"))));
    let cmds = state.toggle_favorite_focused();
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::ToggleFavorite { fis_code }] if fis_code == "6190002"
    ));

    apply_delta(
        &mut state,
        Delta::FavoriteToggled {
            fis_code: "6190002".to_string(),
            result: Err(BackendError::Conflict("dup".to_string())),
        },
    );
    assert_eq!(
        state.status.as_deref(),
        Some("Questo atleta è già nei tuoi preferiti!")
    );
}

#[test]
fn favorites_search_fires_once_typing_pauses() {
    let mut state = new_state(Page::Favorites);
    let start = Instant::now();
    state.begin_edit(EditTarget::FavoritesSearch);
    state.edit_input(|s| s.push('r'), start);
    state.edit_input(|s| s.push_str("os"), start + Duration::from_millis(100));

    assert!(state.tick(start + Duration::from_millis(350)).is_empty());
    let cmds = state.tick(start + Duration::from_millis(400));
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::SearchFavorites { text, .. }] if text == "ros"
    ));
    assert!(state.tick(start + Duration::from_secs(2)).is_empty());

    state.edit_input(String::clear, start + Duration::from_secs(3));
    assert!(state.tick(start + Duration::from_secs(4)).is_empty());
    assert!(state.favorites_view.search.value().is_none());
}

#[test]
fn sign_out_clears_favorites_and_reloads_page() {
    let mut state = new_state(Page::Favorites);
    assert!(state.enter_current().is_empty());

    let cmds = apply_delta(&mut state, Delta::SessionChanged(Some(session("demo@skirank.app"))));
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchFavoriteAthletes { .. }]
    ));
    apply_delta(&mut state, Delta::Favorites(vec!["6190001".to_string()]));
    assert!(state.is_favorite("6190001"));

    let cmds = apply_delta(&mut state, Delta::SessionChanged(None));
    assert!(cmds.is_empty());
    assert!(state.favorites.is_empty());
    assert!(state.favorites_view.favorite_rows().is_empty());
}

#[test]
fn detail_pages_always_fetch_and_malformed_routes_go_home() {
    let mut state = new_state(Page::Rank);
    state.enter_current();
    let cmds = state.apply_fragment("#event-0001-2025-10-26");
    assert!(matches!(
        cmds.as_slice(),
        [ProviderCommand::FetchEventDetail { .. }]
    ));
    let cmds = state.apply_fragment("#event-0001-2025-10-26");
    assert_eq!(cmds.len(), 1);

    let cmds = state.apply_fragment("#athlete-");
    assert_eq!(state.current(), &NavigationState::Page(Page::Rank));
    assert!(cmds.is_empty(), "ranking is already loading");
    assert!(state.event_detail.key.is_none());
}

#[test]
fn log_buffer_is_bounded() {
    let mut state = new_state(Page::About);
    for i in 0..250 {
        state.push_log(format!("line {i}"));
    }
    assert_eq!(state.logs.len(), skirank_terminal::state::MAX_LOGS);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 50"));
}
