use crate::backend::{BackendError, PageWindow};

/// Tag attached to every in-flight request; only the latest one is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Copy, Default)]
pub struct TicketCounter {
    latest: u64,
}

impl TicketCounter {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest && self.latest != 0
    }

    /// Invalidates whatever is in flight without starting a new request.
    pub fn cancel(&mut self) {
        self.latest += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    InitialLoading,
    LoadingMore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub ticket: Ticket,
    pub window: PageWindow,
}

/// Accumulated rows of one paginated list plus its loading model.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    page_size: usize,
    pages_loaded: usize,
    rows: Vec<T>,
    has_more: bool,
    state: LoadState,
    loaded: bool,
    error: Option<BackendError>,
    tickets: TicketCounter,
}

impl<T> Paginator<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            pages_loaded: 0,
            rows: Vec::new(),
            has_more: false,
            state: LoadState::Idle,
            loaded: false,
            error: None,
            tickets: TicketCounter::default(),
        }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state != LoadState::Idle
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn error(&self) -> Option<&BackendError> {
        self.error.as_ref()
    }

    /// Filter changed: drop the list and ask for the first page.
    pub fn begin_reset(&mut self) -> PageRequest {
        self.rows.clear();
        self.pages_loaded = 0;
        self.has_more = true;
        self.error = None;
        self.state = LoadState::InitialLoading;
        PageRequest {
            ticket: self.tickets.issue(),
            window: PageWindow {
                offset: 0,
                limit: self.page_size,
            },
        }
    }

    /// Next page, unless the list is exhausted or a request is outstanding.
    pub fn begin_more(&mut self) -> Option<PageRequest> {
        if !self.has_more || self.state != LoadState::Idle || self.error.is_some() {
            return None;
        }
        self.state = LoadState::LoadingMore;
        Some(PageRequest {
            ticket: self.tickets.issue(),
            window: PageWindow {
                offset: self.pages_loaded * self.page_size,
                limit: self.page_size,
            },
        })
    }

    /// Applies a response. Returns false when the ticket is stale.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<T>, BackendError>) -> bool {
        if !self.tickets.is_current(ticket) || self.state == LoadState::Idle {
            return false;
        }
        match result {
            Ok(rows) => {
                self.has_more = rows.len() >= self.page_size;
                if self.state == LoadState::InitialLoading {
                    self.rows = rows;
                } else {
                    self.rows.extend(rows);
                }
                self.pages_loaded += 1;
                self.error = None;
            }
            Err(err) => {
                if self.state == LoadState::InitialLoading {
                    self.rows.clear();
                    self.has_more = false;
                }
                self.error = Some(err);
            }
        }
        self.state = LoadState::Idle;
        self.loaded = true;
        true
    }

    pub fn clear(&mut self) {
        self.tickets.cancel();
        self.rows.clear();
        self.pages_loaded = 0;
        self.has_more = false;
        self.state = LoadState::Idle;
        self.loaded = false;
        self.error = None;
    }
}

/// Single-shot fetch slot (details, comparison, search results).
#[derive(Debug, Clone)]
pub struct FetchSlot<T> {
    value: Option<T>,
    loading: bool,
    tickets: TicketCounter,
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            tickets: TicketCounter::default(),
        }
    }
}

impl<T> FetchSlot<T> {
    pub fn begin(&mut self) -> Ticket {
        self.value = None;
        self.loading = true;
        self.tickets.issue()
    }

    pub fn apply(&mut self, ticket: Ticket, value: T) -> bool {
        if !self.tickets.is_current(ticket) || !self.loading {
            return false;
        }
        self.value = Some(value);
        self.loading = false;
        true
    }

    pub fn clear(&mut self) {
        self.tickets.cancel();
        self.value = None;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }
}
