use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthForm, AuthRequest, Session};
use crate::backend::{AthleteQuery, BackendError, EventQuery, PageWindow};
use crate::comparison::{self, ComparisonOutcome};
use crate::debounce::Debouncer;
use crate::detail::{self, AthleteDetail, DetailOutcome, EventDetail};
use crate::favorites::FavoriteChange;
use crate::filters::{AthleteFilterState, EventFilters};
use crate::models::{Athlete, Discipline, Event, EventKey, Gender};
use crate::paging::{FetchSlot, Paginator, Ticket};
use crate::router::{NavigationState, Page, ViewRouter};

pub const MAX_LOGS: usize = 200;

pub const LOGIN_REQUIRED: &str = "Devi effettuare il login per gestire i tuoi preferiti.";
pub const ALREADY_FAVORITE: &str = "Questo atleta è già nei tuoi preferiti!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    AthleteName,
    AthleteCode,
    AthleteCountry,
    AgeMin,
    AgeMax,
    EventCountry,
    CompareFirst,
    CompareSecond,
    FavoritesSearch,
    Route,
}

impl EditTarget {
    pub fn label(self) -> &'static str {
        match self {
            EditTarget::AthleteName => "Nome atleta",
            EditTarget::AthleteCode => "FIS Code",
            EditTarget::AthleteCountry => "Nazionalità",
            EditTarget::AgeMin => "Età min",
            EditTarget::AgeMax => "Età max",
            EditTarget::EventCountry => "Paese (codice)",
            EditTarget::CompareFirst => "FIS Code atleta 1",
            EditTarget::CompareSecond => "FIS Code atleta 2",
            EditTarget::FavoritesSearch => "Cerca per nome o FIS Code",
            EditTarget::Route => "Route",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageSizes {
    pub rank: usize,
    pub athletes: usize,
    pub events: usize,
}

#[derive(Debug, Clone)]
pub struct RankView {
    pub gender: Gender,
    pub list: Paginator<Athlete>,
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct AthletesView {
    pub filters: AthleteFilterState,
    pub list: Paginator<Athlete>,
    pub selected: usize,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventsView {
    pub filters: EventFilters,
    pub list: Paginator<Event>,
    pub selected: usize,
    pub message: Option<String>,
}

impl EventsView {
    pub fn visible(&self) -> Vec<&Event> {
        self.filters.visible(self.list.rows())
    }
}

pub type AthleteRows = Result<Vec<Athlete>, BackendError>;

#[derive(Debug, Clone)]
pub struct FavoritesView {
    pub list: FetchSlot<AthleteRows>,
    pub query: String,
    pub search: FetchSlot<AthleteRows>,
    pub debounce: Debouncer<String>,
    pub selected: usize,
    pub message: Option<String>,
}

impl FavoritesView {
    pub fn search_rows(&self) -> &[Athlete] {
        match self.search.value() {
            Some(Ok(rows)) => rows,
            _ => &[],
        }
    }

    pub fn favorite_rows(&self) -> &[Athlete] {
        match self.list.value() {
            Some(Ok(rows)) => rows,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompareView {
    pub first: String,
    pub second: String,
    pub result: FetchSlot<ComparisonOutcome>,
    pub error: Option<String>,
    pub selected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AthleteDetailView {
    pub fis_code: Option<String>,
    pub detail: FetchSlot<AthleteDetail>,
    pub selected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct EventDetailView {
    pub key: Option<EventKey>,
    pub detail: FetchSlot<EventDetail>,
    pub selected: usize,
}

impl EventDetailView {
    /// Finished rows first, then the rest; the order the page lists them in.
    pub fn ordered_codes(&self) -> Vec<String> {
        match self.detail.value() {
            Some(DetailOutcome::Ready { related, .. }) => {
                let (finished, others) = detail::split_results(related);
                finished
                    .into_iter()
                    .chain(others)
                    .map(|r| r.fis_code.clone())
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub router: ViewRouter,
    pub theme: Theme,
    pub rank: RankView,
    pub athletes: AthletesView,
    pub events: EventsView,
    pub favorites_view: FavoritesView,
    pub compare: CompareView,
    pub athlete_detail: AthleteDetailView,
    pub event_detail: EventDetailView,
    pub favorites: Vec<String>,
    pub session: Option<String>,
    pub auth: AuthForm,
    pub sign_out_pending: bool,
    pub editing: Option<EditTarget>,
    pub input: String,
    pub help_overlay: bool,
    pub status: Option<String>,
    pub backend_label: String,
    pub logs: VecDeque<String>,
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    FetchRanked {
        ticket: Ticket,
        gender: Gender,
        window: PageWindow,
    },
    FetchAthletes {
        ticket: Ticket,
        query: AthleteQuery,
        window: PageWindow,
    },
    FetchEvents {
        ticket: Ticket,
        query: EventQuery,
        window: PageWindow,
    },
    FetchAthleteDetail {
        ticket: Ticket,
        fis_code: String,
    },
    FetchEventDetail {
        ticket: Ticket,
        key: EventKey,
    },
    Compare {
        ticket: Ticket,
        first: String,
        second: String,
    },
    FetchFavoriteAthletes {
        ticket: Ticket,
    },
    SearchFavorites {
        ticket: Ticket,
        text: String,
    },
    ToggleFavorite {
        fis_code: String,
    },
    AddFavorite {
        fis_code: String,
    },
    Authenticate(AuthRequest),
    RestoreSession(Session),
    SignOut,
    OAuthUrl,
}

#[derive(Debug, Clone)]
pub enum Delta {
    RankedPage {
        ticket: Ticket,
        result: AthleteRows,
    },
    AthletesPage {
        ticket: Ticket,
        result: AthleteRows,
    },
    EventsPage {
        ticket: Ticket,
        result: Result<Vec<Event>, BackendError>,
    },
    AthleteDetail {
        ticket: Ticket,
        outcome: AthleteDetail,
    },
    EventDetail {
        ticket: Ticket,
        outcome: EventDetail,
    },
    Comparison {
        ticket: Ticket,
        outcome: ComparisonOutcome,
    },
    FavoriteAthletes {
        ticket: Ticket,
        result: AthleteRows,
    },
    FavoritesSearch {
        ticket: Ticket,
        result: AthleteRows,
    },
    Favorites(Vec<String>),
    FavoriteToggled {
        fis_code: String,
        result: Result<FavoriteChange, BackendError>,
    },
    FavoriteAdded {
        fis_code: String,
        result: Result<(), BackendError>,
    },
    SessionChanged(Option<Session>),
    AuthFailed(String),
    AuthNotice(String),
    OAuthUrl(String),
    Log(String),
}

impl AppState {
    pub fn new(initial: NavigationState, sizes: PageSizes, debounce: Duration, today: NaiveDate) -> Self {
        Self {
            router: ViewRouter::new(initial),
            theme: Theme::default(),
            rank: RankView {
                gender: Gender::Male,
                list: Paginator::new(sizes.rank),
                selected: 0,
            },
            athletes: AthletesView {
                filters: AthleteFilterState::default(),
                list: Paginator::new(sizes.athletes),
                selected: 0,
                message: None,
            },
            events: EventsView {
                filters: EventFilters::new(today),
                list: Paginator::new(sizes.events),
                selected: 0,
                message: None,
            },
            favorites_view: FavoritesView {
                list: FetchSlot::default(),
                query: String::new(),
                search: FetchSlot::default(),
                debounce: Debouncer::new(debounce),
                selected: 0,
                message: None,
            },
            compare: CompareView::default(),
            athlete_detail: AthleteDetailView::default(),
            event_detail: EventDetailView::default(),
            favorites: Vec::new(),
            session: None,
            auth: AuthForm::default(),
            sign_out_pending: false,
            editing: None,
            input: String::new(),
            help_overlay: false,
            status: None,
            backend_label: String::new(),
            logs: VecDeque::new(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn is_favorite(&self, fis_code: &str) -> bool {
        self.favorites.iter().any(|c| c == fis_code)
    }

    pub fn current(&self) -> &NavigationState {
        self.router.current()
    }

    // ---- navigation ----

    pub fn navigate_to(&mut self, state: NavigationState) -> Vec<ProviderCommand> {
        self.router.navigate_to(state);
        self.after_route_change()
    }

    pub fn go_back(&mut self) -> Vec<ProviderCommand> {
        self.router.go_back();
        self.after_route_change()
    }

    pub fn apply_fragment(&mut self, fragment: &str) -> Vec<ProviderCommand> {
        self.router.apply_fragment(fragment);
        self.after_route_change()
    }

    pub fn open_page(&mut self, page: Page) -> Vec<ProviderCommand> {
        if self.router.current() == &NavigationState::Page(page) {
            return Vec::new();
        }
        self.navigate_to(NavigationState::Page(page))
    }

    fn after_route_change(&mut self) -> Vec<ProviderCommand> {
        self.status = None;
        if !matches!(self.router.current(), NavigationState::Athlete(_)) {
            self.athlete_detail.detail.clear();
            self.athlete_detail.fis_code = None;
        }
        if !matches!(self.router.current(), NavigationState::Event(_)) {
            self.event_detail.detail.clear();
            self.event_detail.key = None;
        }
        self.enter_current()
    }

    /// Loads whatever the current page needs. List pages keep their rows
    /// and filters; detail pages always fetch.
    pub fn enter_current(&mut self) -> Vec<ProviderCommand> {
        match self.router.current().clone() {
            NavigationState::Page(Page::Rank) => {
                if self.rank.list.loaded() || self.rank.list.is_loading() {
                    Vec::new()
                } else {
                    self.reload_rank()
                }
            }
            NavigationState::Page(Page::Athletes) => {
                if self.athletes.list.loaded() || self.athletes.list.is_loading() {
                    Vec::new()
                } else {
                    self.reload_athletes()
                }
            }
            NavigationState::Page(Page::Events) => {
                if self.events.list.loaded() || self.events.list.is_loading() {
                    Vec::new()
                } else {
                    self.reload_events()
                }
            }
            NavigationState::Page(Page::Favorites) => self.reload_favorites(),
            NavigationState::Page(Page::Compare) | NavigationState::Page(Page::About) => {
                Vec::new()
            }
            NavigationState::Athlete(fis_code) => {
                self.athlete_detail.fis_code = Some(fis_code.clone());
                self.athlete_detail.selected = 0;
                let ticket = self.athlete_detail.detail.begin();
                vec![ProviderCommand::FetchAthleteDetail { ticket, fis_code }]
            }
            NavigationState::Event(key) => {
                self.event_detail.key = Some(key.clone());
                self.event_detail.selected = 0;
                let ticket = self.event_detail.detail.begin();
                vec![ProviderCommand::FetchEventDetail { ticket, key }]
            }
        }
    }

    pub fn refresh(&mut self) -> Vec<ProviderCommand> {
        match self.router.current() {
            NavigationState::Page(Page::Rank) => self.reload_rank(),
            NavigationState::Page(Page::Athletes) => self.reload_athletes(),
            NavigationState::Page(Page::Events) => self.reload_events(),
            NavigationState::Page(Page::Compare) => {
                if self.compare.result.value().is_some() {
                    self.submit_comparison()
                } else {
                    Vec::new()
                }
            }
            _ => self.enter_current(),
        }
    }

    // ---- list fetchers ----

    pub fn reload_rank(&mut self) -> Vec<ProviderCommand> {
        let request = self.rank.list.begin_reset();
        self.rank.selected = 0;
        vec![ProviderCommand::FetchRanked {
            ticket: request.ticket,
            gender: self.rank.gender,
            window: request.window,
        }]
    }

    pub fn toggle_rank_gender(&mut self) -> Vec<ProviderCommand> {
        self.rank.gender = self.rank.gender.opposite();
        self.reload_rank()
    }

    pub fn reload_athletes(&mut self) -> Vec<ProviderCommand> {
        let request = self.athletes.list.begin_reset();
        self.athletes.selected = 0;
        vec![ProviderCommand::FetchAthletes {
            ticket: request.ticket,
            query: self.athletes.filters.filters().query(),
            window: request.window,
        }]
    }

    pub fn reload_events(&mut self) -> Vec<ProviderCommand> {
        let request = self.events.list.begin_reset();
        self.events.selected = 0;
        self.events.message = None;
        vec![ProviderCommand::FetchEvents {
            ticket: request.ticket,
            query: self.events.filters.query(),
            window: request.window,
        }]
    }

    pub fn reload_favorites(&mut self) -> Vec<ProviderCommand> {
        if self.session.is_none() {
            self.favorites_view.list.clear();
            return Vec::new();
        }
        let ticket = self.favorites_view.list.begin();
        vec![ProviderCommand::FetchFavoriteAthletes { ticket }]
    }

    pub fn load_more(&mut self) -> Vec<ProviderCommand> {
        match self.router.current() {
            NavigationState::Page(Page::Rank) => self
                .rank
                .list
                .begin_more()
                .map(|request| ProviderCommand::FetchRanked {
                    ticket: request.ticket,
                    gender: self.rank.gender,
                    window: request.window,
                })
                .into_iter()
                .collect(),
            NavigationState::Page(Page::Athletes) => {
                let query = self.athletes.filters.filters().query();
                self.athletes
                    .list
                    .begin_more()
                    .map(|request| ProviderCommand::FetchAthletes {
                        ticket: request.ticket,
                        query,
                        window: request.window,
                    })
                    .into_iter()
                    .collect()
            }
            NavigationState::Page(Page::Events) => {
                let query = self.events.filters.query();
                self.events
                    .list
                    .begin_more()
                    .map(|request| ProviderCommand::FetchEvents {
                        ticket: request.ticket,
                        query,
                        window: request.window,
                    })
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    // ---- athletes filters ----

    pub fn toggle_athlete_gender(&mut self, gender: Gender) -> Vec<ProviderCommand> {
        match self.athletes.filters.toggle_gender(gender) {
            Ok(()) => {
                self.athletes.message = None;
                self.reload_athletes()
            }
            Err(err) => {
                self.athletes.message = Some(err.to_string());
                Vec::new()
            }
        }
    }

    pub fn toggle_athlete_discipline(&mut self, discipline: Discipline) -> Vec<ProviderCommand> {
        self.athletes.filters.toggle_discipline(discipline);
        self.reload_athletes()
    }

    pub fn reset_athlete_filters(&mut self) -> Vec<ProviderCommand> {
        self.athletes.filters.reset();
        self.athletes.message = None;
        self.reload_athletes()
    }

    // ---- events filters ----

    pub fn toggle_event_gender(&mut self, gender: Gender) -> Vec<ProviderCommand> {
        self.events.filters.toggle_gender(gender);
        self.reload_events()
    }

    pub fn toggle_event_discipline(&mut self, discipline: Discipline) -> Vec<ProviderCommand> {
        self.events.filters.toggle_discipline(discipline);
        self.reload_events()
    }

    pub fn reset_event_filters(&mut self) -> Vec<ProviderCommand> {
        self.events.filters.reset();
        self.reload_events()
    }

    pub fn cycle_event_view(&mut self) -> Vec<ProviderCommand> {
        self.events.filters.cycle_view();
        self.reload_events()
    }

    pub fn step_events(&mut self, forward: bool) -> Vec<ProviderCommand> {
        self.events.filters.step(forward);
        self.reload_events()
    }

    pub fn events_today(&mut self, today: NaiveDate) -> Vec<ProviderCommand> {
        self.events.filters.go_to_today(today);
        self.reload_events()
    }

    // ---- comparison ----

    pub fn submit_comparison(&mut self) -> Vec<ProviderCommand> {
        match comparison::validate_codes(&self.compare.first, &self.compare.second) {
            Ok((first, second)) => {
                self.compare.error = None;
                self.compare.selected = 0;
                let ticket = self.compare.result.begin();
                vec![ProviderCommand::Compare {
                    ticket,
                    first,
                    second,
                }]
            }
            Err(err) => {
                self.compare.result.clear();
                self.compare.error = Some(err.to_string());
                Vec::new()
            }
        }
    }

    // ---- favorites ----

    pub fn focused_athlete(&self) -> Option<String> {
        match self.router.current() {
            NavigationState::Page(Page::Rank) => self
                .rank
                .list
                .rows()
                .get(self.rank.selected)
                .map(|a| a.fis_code.clone()),
            NavigationState::Page(Page::Athletes) => self
                .athletes
                .list
                .rows()
                .get(self.athletes.selected)
                .map(|a| a.fis_code.clone()),
            NavigationState::Page(Page::Favorites) => {
                let view = &self.favorites_view;
                if view.search_rows().is_empty() {
                    view.favorite_rows()
                        .get(view.selected)
                        .map(|a| a.fis_code.clone())
                } else {
                    view.search_rows()
                        .get(view.selected)
                        .map(|a| a.fis_code.clone())
                }
            }
            NavigationState::Athlete(code) => Some(code.clone()),
            _ => None,
        }
    }

    pub fn toggle_favorite_focused(&mut self) -> Vec<ProviderCommand> {
        let Some(fis_code) = self.focused_athlete() else {
            return Vec::new();
        };
        if self.session.is_none() {
            self.status = Some(LOGIN_REQUIRED.to_string());
            return Vec::new();
        }
        vec![ProviderCommand::ToggleFavorite { fis_code }]
    }

    pub fn set_favorites_query(&mut self, text: &str, now: Instant) {
        self.favorites_view.query = text.to_string();
        self.favorites_view.debounce.schedule(text.trim().to_string(), now);
    }

    pub fn tick(&mut self, now: Instant) -> Vec<ProviderCommand> {
        let Some(text) = self.favorites_view.debounce.poll(now) else {
            return Vec::new();
        };
        self.favorites_view.selected = 0;
        if text.is_empty() {
            self.favorites_view.search.clear();
            return Vec::new();
        }
        let ticket = self.favorites_view.search.begin();
        vec![ProviderCommand::SearchFavorites { ticket, text }]
    }

    // ---- selection ----

    fn current_len(&self) -> usize {
        match self.router.current() {
            NavigationState::Page(Page::Rank) => self.rank.list.rows().len(),
            NavigationState::Page(Page::Athletes) => self.athletes.list.rows().len(),
            NavigationState::Page(Page::Events) => self.events.visible().len(),
            NavigationState::Page(Page::Favorites) => {
                let view = &self.favorites_view;
                if view.search_rows().is_empty() {
                    view.favorite_rows().len()
                } else {
                    view.search_rows().len()
                }
            }
            NavigationState::Page(Page::Compare) => match self.compare.result.value() {
                Some(ComparisonOutcome::Ready(cmp)) => cmp.races.len(),
                _ => 0,
            },
            NavigationState::Page(Page::About) => 0,
            NavigationState::Athlete(_) => match self.athlete_detail.detail.value() {
                Some(DetailOutcome::Ready { related, .. }) => related.len(),
                _ => 0,
            },
            NavigationState::Event(_) => self.event_detail.ordered_codes().len(),
        }
    }

    fn selected_mut(&mut self) -> Option<&mut usize> {
        match self.router.current() {
            NavigationState::Page(Page::Rank) => Some(&mut self.rank.selected),
            NavigationState::Page(Page::Athletes) => Some(&mut self.athletes.selected),
            NavigationState::Page(Page::Events) => Some(&mut self.events.selected),
            NavigationState::Page(Page::Favorites) => Some(&mut self.favorites_view.selected),
            NavigationState::Page(Page::Compare) => Some(&mut self.compare.selected),
            NavigationState::Page(Page::About) => None,
            NavigationState::Athlete(_) => Some(&mut self.athlete_detail.selected),
            NavigationState::Event(_) => Some(&mut self.event_detail.selected),
        }
    }

    /// Moves down; reaching the last row of a paged list asks for the next page.
    pub fn select_next(&mut self) -> Vec<ProviderCommand> {
        let len = self.current_len();
        let Some(selected) = self.selected_mut() else {
            return Vec::new();
        };
        if len == 0 {
            return Vec::new();
        }
        *selected = (*selected + 1).min(len - 1);
        if *selected + 1 == len {
            return self.load_more();
        }
        Vec::new()
    }

    pub fn select_prev(&mut self) {
        if let Some(selected) = self.selected_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.current_len();
        if let Some(selected) = self.selected_mut()
            && *selected >= len
        {
            *selected = len.saturating_sub(1);
        }
    }

    /// Enter on the selected row: opens it, or adds a search hit to favorites.
    pub fn activate(&mut self) -> Vec<ProviderCommand> {
        let target = match self.router.current().clone() {
            NavigationState::Page(Page::Rank) => self
                .rank
                .list
                .rows()
                .get(self.rank.selected)
                .and_then(|a| NavigationState::athlete(&a.fis_code)),
            NavigationState::Page(Page::Athletes) => self
                .athletes
                .list
                .rows()
                .get(self.athletes.selected)
                .and_then(|a| NavigationState::athlete(&a.fis_code)),
            NavigationState::Page(Page::Events) => {
                let picked = self
                    .events
                    .visible()
                    .get(self.events.selected)
                    .map(|event| (event.cancelled, event.key()));
                match picked {
                    Some((true, _)) => {
                        self.events.message = Some("Evento cancellato".to_string());
                        None
                    }
                    Some((false, key)) => key.map(NavigationState::Event),
                    None => None,
                }
            }
            NavigationState::Page(Page::Favorites) => {
                let view = &self.favorites_view;
                if let Some(hit) = view.search_rows().get(view.selected) {
                    if self.session.is_none() {
                        self.status = Some(LOGIN_REQUIRED.to_string());
                        return Vec::new();
                    }
                    return vec![ProviderCommand::AddFavorite {
                        fis_code: hit.fis_code.clone(),
                    }];
                }
                view.favorite_rows()
                    .get(view.selected)
                    .and_then(|a| NavigationState::athlete(&a.fis_code))
            }
            NavigationState::Page(Page::Compare) => match self.compare.result.value() {
                Some(ComparisonOutcome::Ready(cmp)) => cmp
                    .races
                    .get(self.compare.selected)
                    .and_then(|r| r.event_key())
                    .map(NavigationState::Event),
                _ => None,
            },
            NavigationState::Page(Page::About) => None,
            NavigationState::Athlete(_) => match self.athlete_detail.detail.value() {
                Some(DetailOutcome::Ready { related, .. }) => related
                    .get(self.athlete_detail.selected)
                    .and_then(|r| r.event_key())
                    .map(NavigationState::Event),
                _ => None,
            },
            NavigationState::Event(_) => self
                .event_detail
                .ordered_codes()
                .get(self.event_detail.selected)
                .and_then(|code| NavigationState::athlete(code)),
        };
        match target {
            Some(state) => self.navigate_to(state),
            None => Vec::new(),
        }
    }

    // ---- text input ----

    pub fn begin_edit(&mut self, target: EditTarget) {
        let filters = self.athletes.filters.filters();
        self.input = match target {
            EditTarget::AthleteName => filters.name.clone(),
            EditTarget::AthleteCode => filters.fis_code.clone(),
            EditTarget::AthleteCountry => filters.country.clone(),
            EditTarget::AgeMin => filters.age_min.map(|v| v.to_string()).unwrap_or_default(),
            EditTarget::AgeMax => filters.age_max.map(|v| v.to_string()).unwrap_or_default(),
            EditTarget::EventCountry => self.events.filters.country.clone().unwrap_or_default(),
            EditTarget::CompareFirst => self.compare.first.clone(),
            EditTarget::CompareSecond => self.compare.second.clone(),
            EditTarget::FavoritesSearch => self.favorites_view.query.clone(),
            EditTarget::Route => self.router.fragment().to_string(),
        };
        self.editing = Some(target);
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.input.clear();
    }

    /// Keystroke while editing. The favorites search reacts live.
    pub fn edit_input(&mut self, change: impl FnOnce(&mut String), now: Instant) {
        change(&mut self.input);
        if self.editing == Some(EditTarget::FavoritesSearch) {
            let text = self.input.clone();
            self.set_favorites_query(&text, now);
        }
    }

    pub fn commit_edit(&mut self) -> Vec<ProviderCommand> {
        let Some(target) = self.editing.take() else {
            return Vec::new();
        };
        let value = std::mem::take(&mut self.input);
        let age = |raw: &str| raw.trim().parse::<u32>().ok();
        match target {
            EditTarget::AthleteName => {
                self.athletes.filters.set_name(&value);
                self.reload_athletes()
            }
            EditTarget::AthleteCode => {
                self.athletes.filters.set_fis_code(&value);
                self.reload_athletes()
            }
            EditTarget::AthleteCountry => {
                self.athletes.filters.set_country(value.trim());
                self.reload_athletes()
            }
            EditTarget::AgeMin => {
                self.athletes.filters.set_age_min(age(&value));
                self.reload_athletes()
            }
            EditTarget::AgeMax => {
                self.athletes.filters.set_age_max(age(&value));
                self.reload_athletes()
            }
            EditTarget::EventCountry => {
                self.events.filters.set_country(Some(value.as_str()));
                self.events.selected = 0;
                Vec::new()
            }
            EditTarget::CompareFirst => {
                self.compare.first = value;
                Vec::new()
            }
            EditTarget::CompareSecond => {
                self.compare.second = value;
                Vec::new()
            }
            EditTarget::FavoritesSearch => Vec::new(),
            EditTarget::Route => self.apply_fragment(&value),
        }
    }

    // ---- auth ----

    pub fn submit_auth(&mut self) -> Vec<ProviderCommand> {
        match self.auth.submit() {
            Some(request) => vec![ProviderCommand::Authenticate(request)],
            None => Vec::new(),
        }
    }

    pub fn request_sign_out(&mut self) {
        if self.session.is_some() {
            self.sign_out_pending = true;
        }
    }

    pub fn confirm_sign_out(&mut self) -> Vec<ProviderCommand> {
        self.sign_out_pending = false;
        vec![ProviderCommand::SignOut]
    }
}

fn warn(state: &mut AppState, what: &str, err: &BackendError) {
    state.push_log(format!("[WARN] {what}: {err}"));
}

/// Folds a provider delta into the state. Returns follow-up commands.
pub fn apply_delta(state: &mut AppState, delta: Delta) -> Vec<ProviderCommand> {
    match delta {
        Delta::RankedPage { ticket, result } => {
            if let Err(err) = &result {
                warn(state, "Ranking fetch failed", err);
            }
            state.rank.list.apply(ticket, result);
            state.clamp_selection();
            Vec::new()
        }
        Delta::AthletesPage { ticket, result } => {
            if let Err(err) = &result {
                warn(state, "Athletes fetch failed", err);
            }
            if !state.athletes.list.apply(ticket, result) {
                return Vec::new();
            }
            state.clamp_selection();
            if state.athletes.filters.observe_results(state.athletes.list.rows()) {
                if let Some(gender) = state.athletes.filters.detected_gender() {
                    state.push_log(format!(
                        "[INFO] Gender filter set to {} from search",
                        gender.athlete_value()
                    ));
                }
                return state.reload_athletes();
            }
            Vec::new()
        }
        Delta::EventsPage { ticket, result } => {
            if let Err(err) = &result {
                warn(state, "Events fetch failed", err);
            }
            state.events.list.apply(ticket, result);
            state.clamp_selection();
            Vec::new()
        }
        Delta::AthleteDetail { ticket, outcome } => {
            match &outcome {
                DetailOutcome::Failed(err) => warn(state, "Athlete fetch failed", err),
                DetailOutcome::Ready {
                    related_error: Some(err),
                    ..
                } => warn(state, "Recent results fetch failed", err),
                _ => {}
            }
            state.athlete_detail.detail.apply(ticket, outcome);
            Vec::new()
        }
        Delta::EventDetail { ticket, outcome } => {
            match &outcome {
                DetailOutcome::Failed(err) => warn(state, "Event fetch failed", err),
                DetailOutcome::Ready {
                    related_error: Some(err),
                    ..
                } => warn(state, "Event results fetch failed", err),
                _ => {}
            }
            state.event_detail.detail.apply(ticket, outcome);
            Vec::new()
        }
        Delta::Comparison { ticket, outcome } => {
            if let ComparisonOutcome::Failed(err) = &outcome {
                warn(state, "Comparison failed", err);
            }
            state.compare.result.apply(ticket, outcome);
            Vec::new()
        }
        Delta::FavoriteAthletes { ticket, result } => {
            if let Err(err) = &result {
                warn(state, "Favorites fetch failed", err);
            }
            state.favorites_view.list.apply(ticket, result);
            state.clamp_selection();
            Vec::new()
        }
        Delta::FavoritesSearch { ticket, result } => {
            if let Err(err) = &result {
                warn(state, "Athlete search failed", err);
            }
            state.favorites_view.search.apply(ticket, result);
            state.clamp_selection();
            Vec::new()
        }
        Delta::Favorites(codes) => {
            state.favorites = codes;
            if state.current() == &NavigationState::Page(Page::Favorites) {
                return state.reload_favorites();
            }
            Vec::new()
        }
        Delta::FavoriteToggled { fis_code, result } => {
            let message = match result {
                Ok(FavoriteChange::Added) => format!("{fis_code} aggiunto ai preferiti"),
                Ok(FavoriteChange::Removed) => format!("{fis_code} rimosso dai preferiti"),
                Err(BackendError::Unauthenticated) => LOGIN_REQUIRED.to_string(),
                Err(err) if err.is_conflict() => ALREADY_FAVORITE.to_string(),
                Err(err) => {
                    warn(state, "Favorite update failed", &err);
                    format!("Errore: {err}")
                }
            };
            state.status = Some(message);
            Vec::new()
        }
        Delta::FavoriteAdded { fis_code, result } => {
            let view = &mut state.favorites_view;
            match result {
                Ok(()) => {
                    view.query.clear();
                    view.search.clear();
                    view.debounce.cancel();
                    view.selected = 0;
                    view.message = Some(format!("{fis_code} aggiunto ai preferiti"));
                }
                Err(err) if err.is_conflict() => {
                    view.message = Some(ALREADY_FAVORITE.to_string());
                }
                Err(BackendError::Unauthenticated) => {
                    view.message = Some(LOGIN_REQUIRED.to_string());
                }
                Err(err) => {
                    view.message = Some(format!("Errore: {err}"));
                    warn(state, "Favorite insert failed", &err);
                }
            }
            Vec::new()
        }
        Delta::SessionChanged(session) => {
            let user = session.as_ref().map(|s| s.label().to_string());
            let signed_in = user.is_some();
            match &user {
                Some(label) => state.push_log(format!("[INFO] Signed in as {label}")),
                None => state.push_log("[INFO] Signed out"),
            }
            state.session = user;
            state.sign_out_pending = false;
            if signed_in {
                state.auth.close();
            } else {
                state.favorites.clear();
                state.favorites_view.list.clear();
                state.favorites_view.search.clear();
            }
            if state.current() == &NavigationState::Page(Page::Favorites) {
                return state.reload_favorites();
            }
            Vec::new()
        }
        Delta::AuthFailed(message) => {
            state.push_log(format!("[WARN] Auth failed: {message}"));
            state.auth.loading = false;
            state.auth.error = Some(message);
            Vec::new()
        }
        Delta::AuthNotice(message) => {
            state.auth.loading = false;
            state.auth.notice = Some(message);
            Vec::new()
        }
        Delta::OAuthUrl(url) => {
            state.auth.oauth_url = Some(url);
            Vec::new()
        }
        Delta::Log(msg) => {
            state.push_log(msg);
            Vec::new()
        }
    }
}
