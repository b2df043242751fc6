use crate::models::{EventKey, parse_iso_date};

const ATHLETE_PREFIX: &str = "athlete-";
const EVENT_PREFIX: &str = "event-";

/// Top-level pages reachable from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Rank,
    Athletes,
    Events,
    Favorites,
    Compare,
    About,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Rank,
        Page::Athletes,
        Page::Events,
        Page::Favorites,
        Page::Compare,
        Page::About,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Page::Rank => "rank",
            Page::Athletes => "atleti",
            Page::Events => "gare",
            Page::Favorites => "preferiti",
            Page::Compare => "confronto",
            Page::About => "chi-siamo",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Page::Rank => "Rank",
            Page::Athletes => "Atleti",
            Page::Events => "Gare",
            Page::Favorites => "Preferiti",
            Page::Compare => "Confronto",
            Page::About => "Chi siamo",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.tag() == tag)
    }

    pub fn next(self) -> Page {
        let idx = Page::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Page::ALL[(idx + 1) % Page::ALL.len()]
    }

    pub fn prev(self) -> Page {
        let idx = Page::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Page::ALL[(idx + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

/// Current page plus the identifiers that page needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavigationState {
    Page(Page),
    Athlete(String),
    Event(EventKey),
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState::Page(Page::Rank)
    }
}

impl NavigationState {
    pub fn athlete(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.is_empty() {
            None
        } else {
            Some(NavigationState::Athlete(code.to_string()))
        }
    }

    pub fn page(&self) -> Option<Page> {
        match self {
            NavigationState::Page(page) => Some(*page),
            _ => None,
        }
    }

    pub fn is_detail(&self) -> bool {
        !matches!(self, NavigationState::Page(_))
    }
}

/// Decodes a route fragment. Anything unrecognised lands on the root page.
pub fn decode(fragment: &str) -> NavigationState {
    let fragment = fragment.trim();
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

    if let Some(page) = Page::from_tag(fragment) {
        return NavigationState::Page(page);
    }
    if let Some(code) = fragment.strip_prefix(ATHLETE_PREFIX) {
        return NavigationState::athlete(code).unwrap_or_default();
    }
    if let Some(rest) = fragment.strip_prefix(EVENT_PREFIX) {
        return decode_event(rest).unwrap_or_default();
    }
    NavigationState::default()
}

// "<codex>-<yyyy>-<mm>-<dd>": the codex is the first segment, the date is
// every remaining segment rejoined.
fn decode_event(rest: &str) -> Option<NavigationState> {
    let mut parts = rest.split('-');
    let codex = parts.next()?;
    let date_parts: Vec<&str> = parts.collect();
    if codex.is_empty() || date_parts.is_empty() || date_parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let date = parse_iso_date(&date_parts.join("-"))?;
    EventKey::new(codex, date).map(NavigationState::Event)
}

pub fn encode(state: &NavigationState) -> String {
    match state {
        NavigationState::Page(page) => page.tag().to_string(),
        NavigationState::Athlete(code) => format!("{ATHLETE_PREFIX}{code}"),
        NavigationState::Event(key) => {
            format!("{EVENT_PREFIX}{}-{}", key.codex(), key.date_string())
        }
    }
}

/// Current navigation state with a single saved snapshot for "back".
#[derive(Debug, Clone, Default)]
pub struct ViewRouter {
    current: NavigationState,
    previous: Option<NavigationState>,
    fragment: String,
    scroll: u16,
}

impl ViewRouter {
    pub fn new(initial: NavigationState) -> Self {
        let fragment = encode(&initial);
        Self {
            current: initial,
            previous: None,
            fragment,
            scroll: 0,
        }
    }

    pub fn current(&self) -> &NavigationState {
        &self.current
    }

    pub fn previous(&self) -> Option<&NavigationState> {
        self.previous.as_ref()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_down(&mut self, max: u16) {
        self.scroll = self.scroll.saturating_add(1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn navigate_to(&mut self, state: NavigationState) {
        let old = std::mem::replace(&mut self.current, state);
        self.previous = Some(old);
        self.fragment = encode(&self.current);
        self.scroll = 0;
    }

    /// Restores the saved snapshot, or the root page when there is none.
    pub fn go_back(&mut self) {
        self.current = self.previous.take().unwrap_or_default();
        self.fragment = encode(&self.current);
        self.scroll = 0;
    }

    /// Fragment changed outside the app; the saved snapshot is left alone.
    pub fn apply_fragment(&mut self, fragment: &str) {
        self.current = decode(fragment);
        self.fragment = encode(&self.current);
        self.scroll = 0;
    }
}
