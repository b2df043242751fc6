use std::io;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use skirank_terminal::auth::{AuthField, AuthMode};
use skirank_terminal::comparison::{self, Comparison, ComparisonOutcome};
use skirank_terminal::config::{self, BackendKind, Config};
use skirank_terminal::demo_backend::{DEMO_EMAIL, DEMO_PASSWORD, DemoBackend};
use skirank_terminal::detail::{self, DetailOutcome};
use skirank_terminal::display::{self, PLACEHOLDER};
use skirank_terminal::flags;
use skirank_terminal::models::{Athlete, AthleteProfile, Discipline, Gender, SideResult};
use skirank_terminal::paging::{LoadState, Paginator};
use skirank_terminal::persist;
use skirank_terminal::provider;
use skirank_terminal::router::{NavigationState, Page};
use skirank_terminal::state::{
    AppState, Delta, EditTarget, PageSizes, ProviderCommand, Theme, apply_delta,
};
use skirank_terminal::supabase::SupabaseBackend;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn send(&mut self, cmds: Vec<ProviderCommand>) {
        let mut failed = false;
        if let Some(tx) = self.cmd_tx.as_ref() {
            for cmd in cmds {
                if tx.send(cmd).is_err() {
                    failed = true;
                    break;
                }
            }
        }
        if failed {
            self.cmd_tx = None;
            self.state.push_log("[WARN] Backend worker stopped");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.auth.open {
            self.on_auth_key(key);
            return;
        }
        if self.state.sign_out_pending {
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('s')) {
                let cmds = self.state.confirm_sign_out();
                self.send(cmds);
            } else {
                self.state.sign_out_pending = false;
            }
            return;
        }
        if self.state.editing.is_some() {
            self.on_edit_key(key);
            return;
        }
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }
        if let Some(cmds) = self.on_page_key(key) {
            self.send(cmds);
            return;
        }

        let cmds = match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Vec::new()
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = true;
                Vec::new()
            }
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.state.open_page(Page::ALL[idx])
            }
            KeyCode::Tab => {
                let page = self.state.current().page().map_or(Page::Rank, Page::next);
                self.state.open_page(page)
            }
            KeyCode::BackTab => {
                let page = self.state.current().page().map_or(Page::Rank, Page::prev);
                self.state.open_page(page)
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.go_back(),
            KeyCode::Char(':') => {
                self.state.begin_edit(EditTarget::Route);
                Vec::new()
            }
            KeyCode::Char('a') => {
                if self.state.session.is_some() {
                    self.state.request_sign_out();
                } else {
                    self.state.auth.open();
                }
                Vec::new()
            }
            KeyCode::Char('t') => {
                self.state.theme = self.state.theme.toggle();
                persist::save_from_state(&self.state);
                Vec::new()
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.current() == &NavigationState::Page(Page::About) {
                    self.state.router.scroll_down(ABOUT_TEXT.len() as u16);
                    Vec::new()
                } else {
                    self.state.select_next()
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.state.current() == &NavigationState::Page(Page::About) {
                    self.state.router.scroll_up();
                } else {
                    self.state.select_prev();
                }
                Vec::new()
            }
            KeyCode::Enter => self.state.activate(),
            KeyCode::Char('*') => self.state.toggle_favorite_focused(),
            KeyCode::Char('n') => self.state.load_more(),
            KeyCode::Char('R') => self.state.refresh(),
            _ => Vec::new(),
        };
        self.send(cmds);
    }

    /// Keys owned by the page on screen; `None` lets the global map handle it.
    fn on_page_key(&mut self, key: KeyEvent) -> Option<Vec<ProviderCommand>> {
        let state = &mut self.state;
        let page = state.current().page()?;
        let cmds = match (page, key.code) {
            (Page::Rank, KeyCode::Char('g')) => state.toggle_rank_gender(),

            (Page::Athletes, KeyCode::Char('/')) => edit(state, EditTarget::AthleteName),
            (Page::Athletes, KeyCode::Char('c')) => edit(state, EditTarget::AthleteCode),
            (Page::Athletes, KeyCode::Char('p')) => edit(state, EditTarget::AthleteCountry),
            (Page::Athletes, KeyCode::Char('[')) => edit(state, EditTarget::AgeMin),
            (Page::Athletes, KeyCode::Char(']')) => edit(state, EditTarget::AgeMax),
            (Page::Athletes, KeyCode::Char('m')) => state.toggle_athlete_gender(Gender::Male),
            (Page::Athletes, KeyCode::Char('f')) => state.toggle_athlete_gender(Gender::Female),
            (Page::Athletes, KeyCode::Char('r')) => state.reset_athlete_filters(),
            (Page::Athletes, KeyCode::Char(c)) => {
                let discipline = discipline_key(c).filter(|d| Discipline::RANKED.contains(d))?;
                state.toggle_athlete_discipline(discipline)
            }

            (Page::Events, KeyCode::Char('m')) => state.toggle_event_gender(Gender::Male),
            (Page::Events, KeyCode::Char('f')) => state.toggle_event_gender(Gender::Female),
            (Page::Events, KeyCode::Char('p')) => edit(state, EditTarget::EventCountry),
            (Page::Events, KeyCode::Char('v')) => state.cycle_event_view(),
            (Page::Events, KeyCode::Char('h') | KeyCode::Left) => state.step_events(false),
            (Page::Events, KeyCode::Char('l') | KeyCode::Right) => state.step_events(true),
            (Page::Events, KeyCode::Char('.')) => state.events_today(Local::now().date_naive()),
            (Page::Events, KeyCode::Char('r')) => state.reset_event_filters(),
            (Page::Events, KeyCode::Char(c)) => {
                let discipline = discipline_key(c)?;
                state.toggle_event_discipline(discipline)
            }

            (Page::Favorites, KeyCode::Char('/')) => edit(state, EditTarget::FavoritesSearch),

            (Page::Compare, KeyCode::Char('e')) => edit(state, EditTarget::CompareFirst),
            (Page::Compare, KeyCode::Char('s')) => state.submit_comparison(),

            _ => return None,
        };
        Some(cmds)
    }

    fn on_edit_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.state.cancel_edit(),
            KeyCode::Enter => {
                let target = self.state.editing;
                let cmds = self.state.commit_edit();
                self.send(cmds);
                match target {
                    Some(EditTarget::CompareFirst) => {
                        self.state.begin_edit(EditTarget::CompareSecond)
                    }
                    Some(EditTarget::CompareSecond) => {
                        let cmds = self.state.submit_comparison();
                        self.send(cmds);
                    }
                    _ => {}
                }
            }
            KeyCode::Backspace => self.state.edit_input(
                |buf| {
                    buf.pop();
                },
                now,
            ),
            KeyCode::Char(c) => self.state.edit_input(|buf| buf.push(c), now),
            _ => {}
        }
    }

    fn on_auth_key(&mut self, key: KeyEvent) {
        let auth = &mut self.state.auth;
        match key.code {
            KeyCode::Esc => auth.close(),
            KeyCode::Tab | KeyCode::Down => auth.next_field(),
            KeyCode::F(2) => auth.toggle_mode(),
            KeyCode::F(3) => self.send(vec![ProviderCommand::OAuthUrl]),
            KeyCode::Enter => {
                let cmds = self.state.submit_auth();
                self.send(cmds);
            }
            KeyCode::Backspace => {
                auth.active_buffer().pop();
            }
            KeyCode::Char(c) => auth.active_buffer().push(c),
            _ => {}
        }
    }
}

fn edit(state: &mut AppState, target: EditTarget) -> Vec<ProviderCommand> {
    state.begin_edit(target);
    Vec::new()
}

fn discipline_key(c: char) -> Option<Discipline> {
    match c {
        'S' => Some(Discipline::Slalom),
        'G' => Some(Discipline::GiantSlalom),
        'U' => Some(Discipline::SuperG),
        'D' => Some(Discipline::Downhill),
        'T' => Some(Discipline::DownhillTraining),
        'A' => Some(Discipline::AlpineCombined),
        _ => None,
    }
}

fn build_backend(config: &Config) -> Arc<dyn skirank_terminal::backend::Backend> {
    match &config.backend {
        BackendKind::Supabase { url, anon_key } => Arc::new(SupabaseBackend::new(url, anon_key)),
        BackendKind::Demo => Arc::new(DemoBackend::new()),
    }
}

fn main() -> io::Result<()> {
    let config = Config::load().map_err(|err| io::Error::other(format!("{err:#}")))?;
    let prefs = persist::load();
    let cli_route = std::env::args().nth(1);
    let initial = config::initial_route(
        cli_route.as_deref(),
        &config,
        prefs.as_ref().and_then(|p| p.last_route.as_deref()),
    );

    let sizes = PageSizes {
        rank: config.rank_page_size,
        athletes: config.athletes_page_size,
        events: config.events_page_size,
    };
    let mut state = AppState::new(
        initial,
        sizes,
        config.search_debounce,
        Local::now().date_naive(),
    );
    if let Some(prefs) = &prefs {
        state.theme = prefs.theme;
    }
    let backend_label = match &config.backend {
        BackendKind::Supabase { url, .. } => url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string(),
        BackendKind::Demo => {
            state.push_log(format!(
                "[INFO] Demo backend, login with {DEMO_EMAIL} / {DEMO_PASSWORD}"
            ));
            "demo".to_string()
        }
    };
    state.backend_label = backend_label;
    for note in &config.notes {
        state.push_log(note.clone());
    }
    let backend = build_backend(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(term_backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(backend, config, tx, cmd_rx);

    let mut app = App::new(state, Some(cmd_tx));
    if let Some(saved) = persist::load_session() {
        app.state.push_log(format!("[INFO] Restoring session for {}", saved.label()));
        app.send(vec![ProviderCommand::RestoreSession(saved)]);
    }
    let cmds = app.state.enter_current();
    app.send(cmds);
    let res = run_app(&mut terminal, &mut app, rx);
    persist::save_from_state(&app.state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(delta) = rx.try_recv() {
            if let Delta::SessionChanged(session) = &delta {
                persist::save_session(session.as_ref());
            }
            let cmds = apply_delta(&mut app.state, delta);
            app.send(cmds);
        }
        let cmds = app.state.tick(Instant::now());
        app.send(cmds);

        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[derive(Clone, Copy)]
struct Palette {
    base: Style,
    accent: Color,
    muted: Color,
    warn: Color,
    good: Color,
    selected: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            base: Style::default().fg(Color::White).bg(Color::Black),
            accent: Color::Cyan,
            muted: Color::DarkGray,
            warn: Color::Red,
            good: Color::Green,
            selected: Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        },
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            accent: Color::Blue,
            muted: Color::Gray,
            warn: Color::Red,
            good: Color::Green,
            selected: Style::default()
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        },
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let pal = palette(state.theme);
    frame.render_widget(Block::default().style(pal.base), frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_lines(state, pal))
        .style(pal.base)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.current() {
        NavigationState::Page(Page::Rank) => render_rank(frame, chunks[1], state, pal),
        NavigationState::Page(Page::Athletes) => render_athletes(frame, chunks[1], state, pal),
        NavigationState::Page(Page::Events) => render_events(frame, chunks[1], state, pal),
        NavigationState::Page(Page::Favorites) => render_favorites(frame, chunks[1], state, pal),
        NavigationState::Page(Page::Compare) => render_compare(frame, chunks[1], state, pal),
        NavigationState::Page(Page::About) => render_about(frame, chunks[1], state, pal),
        NavigationState::Athlete(_) => render_athlete_detail(frame, chunks[1], state, pal),
        NavigationState::Event(_) => render_event_detail(frame, chunks[1], state, pal),
    }

    let console = Paragraph::new(console_text(state))
        .style(Style::default().fg(pal.muted))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(pal.muted));
    frame.render_widget(footer, chunks[3]);

    if let Some(target) = state.editing {
        render_edit_prompt(frame, frame.size(), state, target, pal);
    }
    if state.auth.open {
        render_auth_overlay(frame, frame.size(), state, pal);
    }
    if state.sign_out_pending {
        render_confirm(frame, frame.size(), pal);
    }
    if state.help_overlay {
        render_help_overlay(frame, frame.size(), pal);
    }
}

fn header_lines(state: &AppState, pal: Palette) -> Vec<Line<'static>> {
    let title = match state.current() {
        NavigationState::Page(page) => page.title().to_string(),
        NavigationState::Athlete(code) => format!("Atleta {code}"),
        NavigationState::Event(key) => format!("Gara {key}"),
    };
    let line1 = Line::from(vec![
        Span::styled(
            "  ⛷  SKIRANK TERMINAL",
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  |  {title}  |  #{}", state.router.fragment())),
    ]);

    let current_page = state.current().page();
    let mut tabs = vec![Span::raw("  ")];
    for (idx, page) in Page::ALL.iter().enumerate() {
        let label = format!(" {} {} ", idx + 1, page.title());
        if current_page == Some(*page) {
            tabs.push(Span::styled(label, pal.selected.fg(pal.accent)));
        } else {
            tabs.push(Span::raw(label));
        }
    }

    let user = match &state.session {
        Some(label) => format!("Utente: {label}"),
        None => "Non autenticato (a: accedi)".to_string(),
    };
    let mut line3 = vec![Span::styled(
        format!("  {user} | Backend: {}", state.backend_label),
        Style::default().fg(pal.muted),
    )];
    if let Some(status) = &state.status {
        line3.push(Span::styled(
            format!(" | {status}"),
            Style::default().fg(pal.good),
        ));
    }
    vec![line1, Line::from(tabs), Line::from(line3)]
}

fn footer_text(state: &AppState) -> String {
    let page_keys = match state.current() {
        NavigationState::Page(Page::Rank) => "g Genere | Enter Atleta | * Preferito | n Altri",
        NavigationState::Page(Page::Athletes) => {
            "/ Nome | c FIS | p Naz | [ ] Età | m/f Genere | S G U D A Disc | r Reset"
        }
        NavigationState::Page(Page::Events) => {
            "←/→ Periodo | v Vista | . Oggi | m/f Genere | S G U D T A Disc | p Paese | r Reset"
        }
        NavigationState::Page(Page::Favorites) => "/ Cerca | Enter Apri/Aggiungi | * Rimuovi",
        NavigationState::Page(Page::Compare) => "e FIS code | s Confronta | Enter Gara",
        NavigationState::Page(Page::About) => "j/k Scorri",
        NavigationState::Athlete(_) => "Enter Gara | * Preferito | b Indietro",
        NavigationState::Event(_) => "Enter Atleta | b Indietro",
    };
    format!(" {page_keys} | 1-6 Pagine | : Route | a Account | t Tema | ? Aiuto | q Esci")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Nessun messaggio".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

/// Header line plus the slice of rows that fits, with the selection highlighted.
fn render_rows(
    frame: &mut Frame,
    area: Rect,
    header: Option<Line<'static>>,
    rows: Vec<Line<'static>>,
    selected: Option<usize>,
    pal: Palette,
) {
    let mut lines = Vec::new();
    let mut height = area.height as usize;
    if let Some(header) = header {
        lines.push(header.patch_style(Style::default().add_modifier(Modifier::BOLD)));
        height = height.saturating_sub(1);
    }
    let (start, end) = visible_range(selected.unwrap_or(0), rows.len(), height);
    for (idx, row) in rows.into_iter().enumerate().take(end).skip(start) {
        if selected == Some(idx) {
            lines.push(row.patch_style(pal.selected));
        } else {
            lines.push(row);
        }
    }
    frame.render_widget(Paragraph::new(lines).style(pal.base), area);
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn paging_status<T>(list: &Paginator<T>) -> Option<String> {
    match list.state() {
        LoadState::InitialLoading => Some("Caricamento...".to_string()),
        LoadState::LoadingMore => Some("Caricamento altri risultati...".to_string()),
        LoadState::Idle => {
            if let Some(err) = list.error() {
                Some(format!("Errore: {err}"))
            } else if list.loaded() && list.rows().is_empty() {
                Some("Nessun risultato".to_string())
            } else if list.has_more() {
                Some(format!("{} righe | n: carica altri", list.rows().len()))
            } else if list.loaded() {
                Some(format!("{} righe", list.rows().len()))
            } else {
                None
            }
        }
    }
}

fn athlete_header(show_age: bool) -> Line<'static> {
    let mut text = format!("{:>4}    {:<28} {:<18}", "#", "Atleta", "Nazione");
    if show_age {
        text.push_str(&format!(" {:>3}", "Età"));
    }
    for discipline in Discipline::RANKED {
        text.push_str(&format!(" {:>8}", discipline.abbr()));
    }
    text.push_str(&format!(" {:>8}", "Totale"));
    Line::from(text)
}

/// `position` overrides the stored ranking; the Rank page numbers rows itself.
fn athlete_line(
    athlete: &Athlete,
    position: Option<u32>,
    favorite: bool,
    show_age: bool,
) -> Line<'static> {
    let mut text = format!(
        "{:>4}  {} {:<28} {} {:<15}",
        display::format_rank(position.or(athlete.ranking)),
        if favorite { "★" } else { " " },
        truncate(&athlete.name, 28),
        flags::flag_for(&athlete.country),
        truncate(&athlete.country, 15),
    );
    if show_age {
        let age = athlete
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        text.push_str(&format!(" {age:>3}"));
    }
    for discipline in Discipline::RANKED {
        text.push_str(&format!(
            " {:>8}",
            display::format_points(athlete.points(discipline))
        ));
    }
    let total = athlete
        .total_points
        .map(|t| format!("{t:.2}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    text.push_str(&format!(" {total:>8}"));
    Line::from(text)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn render_rank(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let title = Line::from(vec![
        Span::styled(
            format!(" Ranking Mondiale - {}", state.rank.gender.label()),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (g: cambia genere)", Style::default().fg(pal.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), sections[0]);

    let rows = state
        .rank
        .list
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, a)| {
            athlete_line(a, Some(idx as u32 + 1), state.is_favorite(&a.fis_code), false)
        })
        .collect();
    render_rows(
        frame,
        sections[1],
        Some(athlete_header(false)),
        rows,
        Some(state.rank.selected),
        pal,
    );
    if let Some(status) = paging_status(&state.rank.list) {
        render_message(frame, sections[2], &status, pal.muted);
    }
}

fn render_athletes(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let view = &state.athletes;
    let filters = view.filters.filters();
    let age = |v: Option<u32>| v.map(|a| a.to_string()).unwrap_or_default();
    let gender = match (filters.gender, view.filters.detected_gender()) {
        (Some(g), Some(d)) if g == d => format!("{} (rilevato)", g.label()),
        (Some(g), _) => g.label().to_string(),
        (None, _) => "Tutti".to_string(),
    };
    let disciplines = if filters.disciplines.is_empty() {
        "Tutte".to_string()
    } else {
        filters
            .disciplines
            .iter()
            .map(|d| d.abbr())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut lines = vec![
        Line::from(format!(
            " Nome: {} | FIS: {} | Nazionalità: {} | Età: {}-{}",
            filters.name,
            filters.fis_code,
            filters.country,
            age(filters.age_min),
            age(filters.age_max)
        )),
        Line::from(format!(" Genere: {gender} | Discipline: {disciplines}")),
        Line::from(Span::styled(
            format!(" {}", filters.ranking_caption()),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(message) = &view.message {
        lines.push(Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(pal.warn),
        )));
    }
    frame.render_widget(Paragraph::new(lines), sections[0]);

    let rows = view
        .list
        .rows()
        .iter()
        .map(|a| athlete_line(a, None, state.is_favorite(&a.fis_code), true))
        .collect();
    render_rows(
        frame,
        sections[1],
        Some(athlete_header(true)),
        rows,
        Some(view.selected),
        pal,
    );
    if let Some(status) = paging_status(&view.list) {
        render_message(frame, sections[2], &status, pal.muted);
    }
}

fn render_events(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let view = &state.events;
    let filters = &view.filters;
    let gender = filters.gender.map_or("Tutti", |g| g.label());
    let disciplines = if filters.disciplines.is_empty() {
        "Tutte".to_string()
    } else {
        filters
            .disciplines
            .iter()
            .map(|d| d.abbr())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut header = vec![
        Line::from(Span::styled(
            format!(
                " {} | Vista {}",
                skirank_terminal::calendar::caption(filters.view, filters.date),
                filters.view.label()
            ),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            " Genere: {gender} | Discipline: {disciplines} | Paese: {}",
            filters.country.as_deref().unwrap_or("Tutti")
        )),
    ];
    if let Some(message) = &view.message {
        header.push(Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(pal.warn),
        )));
    }
    frame.render_widget(Paragraph::new(header), sections[0]);

    let visible = view.visible();
    let mut rows = Vec::new();
    let mut selected_line = None;
    let mut index = 0;
    for (date, events) in skirank_terminal::calendar::group_by_date(visible) {
        rows.push(Line::from(Span::styled(
            format!(" {}", display::long_date(date)),
            Style::default().fg(pal.accent),
        )));
        for event in events {
            if index == view.selected {
                selected_line = Some(rows.len());
            }
            let mut spans = vec![Span::raw(format!(
                "   {:<6} {:<18} {:<8} {} {:<28} {}",
                event.codex,
                event.discipline,
                event.gender,
                flags::flag_for(&event.location.country),
                truncate(&event.location.to_string(), 28),
                event.category
            ))];
            if event.cancelled {
                spans.push(Span::styled(
                    "  CANCELLATA",
                    Style::default().fg(pal.warn).add_modifier(Modifier::BOLD),
                ));
            }
            rows.push(Line::from(spans));
            index += 1;
        }
    }
    if rows.is_empty() && view.list.loaded() && !view.list.is_loading() {
        let empty = if filters.has_active_filters() {
            " Nessuna gara con i filtri selezionati (r: azzera filtri)"
        } else {
            " Nessuna gara in questo periodo"
        };
        render_message(frame, sections[1], empty, pal.muted);
    } else {
        render_rows(frame, sections[1], None, rows, selected_line, pal);
    }
    if let Some(status) = paging_status(&view.list) {
        render_message(frame, sections[2], &status, pal.muted);
    }
}

fn render_favorites(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    if state.session.is_none() {
        render_message(
            frame,
            area,
            " Devi effettuare il login per vedere i tuoi preferiti. Premi a per accedere.",
            pal.muted,
        );
        return;
    }
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let view = &state.favorites_view;
    let searching = if view.search.is_loading() || view.debounce.is_pending() {
        "  ..."
    } else {
        ""
    };
    let search = Line::from(vec![
        Span::styled(" Cerca (/): ", Style::default().fg(pal.accent)),
        Span::raw(format!("{}{searching}", view.query)),
    ]);
    frame.render_widget(Paragraph::new(search), sections[0]);

    let hits = view.search_rows();
    if !hits.is_empty() {
        let rows = hits
            .iter()
            .map(|a| {
                let marker = if state.is_favorite(&a.fis_code) {
                    "★"
                } else {
                    "+"
                };
                Line::from(format!(
                    "  {marker} {:<10} {:<28} {} {}",
                    a.fis_code,
                    truncate(&a.name, 28),
                    flags::flag_for(&a.country),
                    a.country
                ))
            })
            .collect();
        render_rows(
            frame,
            sections[1],
            Some(Line::from(" Risultati ricerca (Enter: aggiungi)")),
            rows,
            Some(view.selected),
            pal,
        );
    } else if !view.query.trim().is_empty() && matches!(view.search.value(), Some(Ok(_))) {
        render_message(frame, sections[1], " Nessun atleta trovato", pal.muted);
    } else {
        match view.list.value() {
            Some(Ok(rows)) if rows.is_empty() => render_message(
                frame,
                sections[1],
                " Non hai ancora aggiunto atleti ai preferiti.",
                pal.muted,
            ),
            Some(Ok(rows)) => {
                let lines = rows.iter().map(|a| athlete_line(a, None, true, true)).collect();
                render_rows(
                    frame,
                    sections[1],
                    Some(athlete_header(true)),
                    lines,
                    Some(view.selected),
                    pal,
                );
            }
            Some(Err(err)) => {
                render_message(frame, sections[1], &format!(" Errore: {err}"), pal.warn)
            }
            None if view.list.is_loading() => {
                render_message(frame, sections[1], " Caricamento...", pal.muted)
            }
            None => {}
        }
    }
    if let Some(message) = &view.message {
        render_message(frame, sections[2], &format!(" {message}"), pal.good);
    }
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let view = &state.compare;
    let mut inputs = vec![Line::from(format!(
        " Atleta 1: [{:<10}]   Atleta 2: [{:<10}]   (e: modifica, s: confronta)",
        view.first, view.second
    ))];
    if let Some(error) = &view.error {
        inputs.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(pal.warn),
        )));
    }
    frame.render_widget(Paragraph::new(inputs), sections[0]);

    match view.result.value() {
        None if view.result.is_loading() => {
            render_message(frame, sections[1], " Confronto in corso...", pal.muted)
        }
        None => render_message(
            frame,
            sections[1],
            " Inserisci due FIS code per confrontare gli atleti testa a testa.",
            pal.muted,
        ),
        Some(ComparisonOutcome::NotFound) => render_message(
            frame,
            sections[1],
            " Nessun dato trovato per questi atleti.",
            pal.warn,
        ),
        Some(ComparisonOutcome::Failed(err)) => render_message(
            frame,
            sections[1],
            &format!(" Errore durante il confronto: {err}"),
            pal.warn,
        ),
        Some(ComparisonOutcome::Ready(cmp)) => {
            render_comparison(frame, sections[1], cmp, view.selected, pal)
        }
    }
}

fn render_comparison(frame: &mut Frame, area: Rect, cmp: &Comparison, selected: usize, pal: Palette) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(columns[0]);

    let stats = &cmp.stats;
    let first = comparison::short_name(&cmp.first.name);
    let second = comparison::short_name(&cmp.second.name);
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                " {} {}  vs  {} {}",
                flags::flag_for(&cmp.first.country),
                cmp.first.name,
                flags::flag_for(&cmp.second.country),
                cmp.second.name
            ),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            " Gare in comune: {} | Confrontabili: {} | Pari: {}",
            stats.shared_races, stats.comparable_races, stats.ties
        )),
        Line::from(format!(" {:<22} {:>10} {:>10}", "", first, second)),
    ];
    let (a, b) = (&stats.first, &stats.second);
    let opt = |v: Option<u32>| v.map(|r| r.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string());
    lines.push(stat_line("Vittorie", a.wins.to_string(), b.wins.to_string()));
    lines.push(stat_line(
        "DNF/DNS/DSQ",
        a.non_finishes.to_string(),
        b.non_finishes.to_string(),
    ));
    lines.push(stat_line(
        "Posizione media",
        format!("{:.1}", a.average_rank),
        format!("{:.1}", b.average_rank),
    ));
    lines.push(stat_line("Miglior piazzamento", opt(a.best_rank), opt(b.best_rank)));
    lines.push(stat_line("Peggior piazzamento", opt(a.worst_rank), opt(b.worst_rank)));
    lines.push(stat_line("Podi", a.top_three.to_string(), b.top_three.to_string()));
    lines.push(stat_line("Top 10", a.top_ten.to_string(), b.top_ten.to_string()));
    lines.push(Line::from(""));
    lines.push(Line::from(" Per disciplina:"));
    for (discipline, tally) in &stats.disciplines {
        lines.push(Line::from(format!(
            "   {:<20} {}-{} su {}",
            discipline, tally.first_wins, tally.second_wins, tally.total
        )));
    }
    let describe = |m: &comparison::Margin| {
        format!(
            "{} {} ({} posizioni)",
            display::short_date(m.event_date),
            m.location,
            m.difference
        )
    };
    if let Some(margin) = &stats.closest_finish {
        lines.push(Line::from(format!(" Arrivo più vicino: {}", describe(margin))));
    }
    if let Some(margin) = &stats.biggest_margin {
        lines.push(Line::from(format!(" Distacco maggiore: {}", describe(margin))));
    }
    let form = &stats.recent_form;
    if form.races > 0 {
        lines.push(Line::from(format!(
            " Forma recente (ultime {}): {} {} - {} {}",
            form.races, first, form.first, form.second, second
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        left[0],
    );
    frame.render_widget(
        wins_chart(first, second, stats.first.wins, stats.second.wins, pal),
        left[1],
    );

    let rows = cmp
        .races
        .iter()
        .map(|race| {
            Line::from(format!(
                " {} {:<22} {:<5} {:>6} {:>6}",
                display::short_date(race.event_date),
                truncate(&race.location.place, 22),
                race.discipline,
                side_label(race.athlete1_result.as_ref()),
                side_label(race.athlete2_result.as_ref())
            ))
        })
        .collect();
    let header = Line::from(format!(
        " {:<10} {:<22} {:<5} {:>6} {:>6}",
        "Data", "Località", "Disc", "A1", "A2"
    ));
    render_rows(frame, columns[1], Some(header), rows, Some(selected), pal);
}

fn stat_line(label: &str, first: String, second: String) -> Line<'static> {
    Line::from(format!(" {label:<22} {first:>10} {second:>10}"))
}

fn side_label(result: Option<&SideResult>) -> String {
    match result {
        Some(SideResult {
            rank: Some(rank), ..
        }) => rank.to_string(),
        Some(SideResult {
            status: Some(status),
            ..
        }) => status.clone(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn wins_chart(first: &str, second: &str, wins1: u32, wins2: u32, pal: Palette) -> BarChart<'static> {
    let bar = |label: &str, value: u32, color: Color| {
        Bar::default()
            .value(u64::from(value))
            .label(Line::from(label.to_string()))
            .text_value(value.to_string())
            .style(Style::default().fg(color))
    };
    let bars = [bar(first, wins1, pal.accent), bar(second, wins2, pal.good)];
    BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(u64::from(wins1.max(wins2).max(1)))
}

fn render_athlete_detail(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let view = &state.athlete_detail;
    let (profile, results) = match view.detail.value() {
        None => {
            render_message(frame, area, " Caricamento...", pal.muted);
            return;
        }
        Some(DetailOutcome::NotFound) => {
            render_message(frame, area, " Atleta non trovato.", pal.warn);
            return;
        }
        Some(DetailOutcome::Failed(err)) => {
            render_message(frame, area, &format!(" Errore: {err}"), pal.warn);
            return;
        }
        Some(DetailOutcome::Ready {
            primary, related, ..
        }) => (primary, related),
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(area);
    frame.render_widget(
        Paragraph::new(profile_lines(profile, state.is_favorite(&profile.fis_code), pal))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::RIGHT)),
        columns[0],
    );

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(columns[1]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            " Ultimi 10 risultati",
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
        sections[0],
    );
    if results.is_empty() {
        render_message(frame, sections[1], " Nessun risultato recente", pal.muted);
        return;
    }
    let rows = results
        .iter()
        .map(|r| {
            let place = match (r.rank, r.status.as_deref()) {
                (Some(rank), _) => rank.to_string(),
                (None, Some(status)) => status.to_string(),
                (None, None) => PLACEHOLDER.to_string(),
            };
            Line::from(format!(
                " {} {:<20} {:<5} {:<8} {:>5} {:>8} {:>6}",
                display::short_date(r.event_date),
                truncate(&r.location.place, 20),
                r.discipline,
                truncate(&r.category, 8),
                place,
                display::format_points(r.fis_points),
                display::format_points(r.cup_points)
            ))
        })
        .collect();
    let header = Line::from(format!(
        " {:<10} {:<20} {:<5} {:<8} {:>5} {:>8} {:>6}",
        "Data", "Località", "Disc", "Cat", "Pos", "FIS pt", "Cup"
    ));
    render_rows(frame, sections[1], Some(header), rows, Some(view.selected), pal);
}

fn profile_lines(profile: &AthleteProfile, favorite: bool, pal: Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            " {} {}{}",
            flags::flag_for(&profile.country),
            profile.name,
            if favorite { "  ★" } else { "" }
        ),
        Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
    ))];
    let mut field = |label: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            lines.push(Line::from(format!(" {label:<16} {value}")));
        }
    };
    field("FIS Code", Some(profile.fis_code.clone()));
    field("Nazione", Some(profile.country.clone()));
    field("Squadra", profile.team.clone());
    field(
        "Nascita",
        profile.birthdate.as_deref().map(|raw| {
            skirank_terminal::models::parse_iso_date(raw)
                .map(display::medium_date)
                .unwrap_or_else(|| raw.to_string())
        }),
    );
    field("Età", profile.age.map(|a| a.to_string()));
    field("Genere", profile.gender.map(|g| g.label().to_string()));
    field("Stato", profile.status.clone());
    field("Soprannome", profile.nickname.clone());
    field("Residenza", profile.residence.clone());
    field("Stato civile", profile.marital_status.clone());
    field("Figli", profile.children.map(|c| c.to_string()));
    field("Professione", profile.occupation.clone());
    field("Lingue", profile.languages.clone());
    field("Hobby", profile.hobbies.clone());
    field("Sci", profile.skis.clone());
    field("Scarponi", profile.boots.clone());
    field("Bastoncini", profile.poles.clone());

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Punti FIS",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for discipline in Discipline::RANKED {
        lines.push(Line::from(format!(
            "   {:<14} {:>8}",
            discipline.full_name(),
            display::format_points(profile.points(discipline))
        )));
    }
    lines
}

fn render_event_detail(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let view = &state.event_detail;
    let (summary, results) = match view.detail.value() {
        None => {
            render_message(frame, area, " Caricamento...", pal.muted);
            return;
        }
        Some(DetailOutcome::NotFound) => {
            render_message(frame, area, " Gara non trovata.", pal.warn);
            return;
        }
        Some(DetailOutcome::Failed(err)) => {
            render_message(frame, area, &format!(" Errore: {err}"), pal.warn);
            return;
        }
        Some(DetailOutcome::Ready {
            primary, related, ..
        }) => (primary, related),
    };

    let event = &summary.event;
    let mut header = vec![
        Line::from(Span::styled(
            format!(
                " {} {} - {} {}",
                flags::flag_for(&event.location.country),
                event.location,
                event.discipline,
                event.gender
            ),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            " {} | {} | Codex {}",
            display::long_date(event.date),
            event.category,
            event.codex
        )),
    ];
    if event.cancelled {
        header.push(Line::from(Span::styled(
            " Gara cancellata",
            Style::default().fg(pal.warn),
        )));
    } else if let Some(url) = &event.event_url {
        header.push(Line::from(Span::styled(
            format!(" {url}"),
            Style::default().fg(pal.muted),
        )));
    }
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header.len() as u16 + 1),
            Constraint::Min(1),
        ])
        .split(area);
    frame.render_widget(Paragraph::new(header), sections[0]);

    if results.is_empty() {
        render_message(frame, sections[1], " Nessun risultato disponibile", pal.muted);
        return;
    }

    let (_, others) = detail::split_results(results);
    let mut head = format!(" {:>4} {:>4}  {:<26} {:<5}", "Pos", "Pett", "Atleta", "Naz");
    for run in &summary.runs {
        head.push_str(&format!(" {:>9}", format!("Manche {run}")));
    }
    head.push_str(&format!(" {:>9} {:>7}", "Tempo", "Dist"));

    let mut rows = Vec::with_capacity(results.len());
    for line in detail::finished_lines(results, &summary.runs) {
        let mut text = format!(
            " {:>4} {:>4}  {:<26} {:<5}",
            line.rank,
            line.bib,
            truncate(&line.name, 26),
            line.country
        );
        for run in &line.runs {
            text.push_str(&format!(" {run:>9}"));
        }
        text.push_str(&format!(" {:>9} {:>7}", line.time, line.gap));
        rows.push(Line::from(text));
    }
    for row in &others {
        rows.push(Line::from(Span::styled(
            format!(
                " {:>4} {:>4}  {:<26} {:<5} {}",
                PLACEHOLDER,
                display::text_or_dash(row.bib.as_deref()),
                truncate(&row.athlete_name, 26),
                row.country,
                display::text_or_dash(row.status.as_deref())
            ),
            Style::default().fg(pal.muted),
        )));
    }
    render_rows(
        frame,
        sections[1],
        Some(Line::from(head)),
        rows,
        Some(view.selected),
        pal,
    );
}

const ABOUT_TEXT: [&str; 16] = [
    "SkiRank",
    "",
    "Classifiche, calendario e risultati della Coppa del Mondo di sci alpino.",
    "",
    "Rank: ranking mondiale per genere, ordinato per punti FIS.",
    "Atleti: ricerca per nome, FIS code, nazionalità, età, genere e discipline.",
    "Gare: calendario giornaliero, settimanale o mensile con filtri.",
    "Preferiti: i tuoi atleti, salvati sul tuo account.",
    "Confronto: statistiche testa a testa tra due atleti.",
    "",
    "I punti FIS più bassi sono migliori; N/A indica punti non disponibili.",
    "",
    "Route: premi : e scrivi ad esempio athlete-6190001 o event-0001-2025-10-26.",
    "",
    "Dati: risultati ufficiali FIS, aggiornati dal backend SkiRank.",
    "Tema chiaro/scuro: t. Account: a.",
];

fn render_about(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let lines: Vec<Line> = ABOUT_TEXT
        .iter()
        .enumerate()
        .map(|(idx, text)| {
            if idx == 0 {
                Line::from(Span::styled(
                    format!(" {text}"),
                    Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!(" {text}"))
            }
        })
        .collect();
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.router.scroll(), 0));
    frame.render_widget(paragraph, area);
}

fn render_edit_prompt(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    target: EditTarget,
    pal: Palette,
) {
    let popup = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![Line::from(format!(" {}▏", state.input))];
    let typed = state.input.trim().to_lowercase();
    let suggestions: Vec<&str> = match target {
        EditTarget::EventCountry => flags::federation_codes()
            .into_iter()
            .filter(|code| code.to_lowercase().starts_with(&typed))
            .take(12)
            .collect(),
        EditTarget::AthleteCountry if !typed.is_empty() => flags::country_names()
            .filter(|name| name.to_lowercase().starts_with(&typed))
            .take(6)
            .collect(),
        _ => Vec::new(),
    };
    if !suggestions.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" {}", suggestions.join("  ")),
            Style::default().fg(pal.muted),
        )));
    }
    let prompt = Paragraph::new(lines).style(pal.base).block(
        Block::default()
            .title(format!("{} (Enter conferma, Esc annulla)", target.label()))
            .borders(Borders::ALL),
    );
    frame.render_widget(prompt, popup);
}

fn render_auth_overlay(frame: &mut Frame, area: Rect, state: &AppState, pal: Palette) {
    let popup = centered_rect(60, 55, area);
    frame.render_widget(Clear, popup);

    let auth = &state.auth;
    let title = match auth.mode {
        AuthMode::Login => "Accedi",
        AuthMode::Register => "Registrati",
    };
    let field_line = |label: &str, value: String, field: AuthField| {
        let line = Line::from(format!(" {label:<18} {value}"));
        if auth.field == field {
            line.patch_style(pal.selected)
        } else {
            line
        }
    };
    let mask = |value: &str| "•".repeat(value.chars().count());
    let mut lines = vec![
        Line::from(""),
        field_line("Email", auth.email.clone(), AuthField::Email),
        field_line("Password", mask(&auth.password), AuthField::Password),
    ];
    if auth.mode == AuthMode::Register {
        lines.push(field_line(
            "Conferma password",
            mask(&auth.confirm),
            AuthField::Confirm,
        ));
    }
    lines.push(Line::from(""));
    if auth.loading {
        lines.push(Line::from(Span::styled(
            " Attendere...",
            Style::default().fg(pal.muted),
        )));
    }
    if let Some(error) = &auth.error {
        lines.push(Line::from(Span::styled(
            format!(" {error}"),
            Style::default().fg(pal.warn),
        )));
    }
    if let Some(notice) = &auth.notice {
        lines.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(pal.good),
        )));
    }
    if let Some(url) = &auth.oauth_url {
        lines.push(Line::from(" Apri nel browser per continuare:"));
        lines.push(Line::from(Span::styled(
            format!(" {url}"),
            Style::default().fg(pal.accent),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Tab campo | Enter invia | F2 login/registrazione | F3 accedi con Google | Esc chiudi",
        Style::default().fg(pal.muted),
    )));

    let overlay = Paragraph::new(lines)
        .style(pal.base)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(overlay, popup);
}

fn render_confirm(frame: &mut Frame, area: Rect, pal: Palette) {
    let popup = centered_rect(40, 15, area);
    frame.render_widget(Clear, popup);
    let confirm = Paragraph::new(" Vuoi davvero uscire dal tuo account? (y/n)")
        .style(pal.base)
        .block(Block::default().title("Logout").borders(Borders::ALL));
    frame.render_widget(confirm, popup);
}

fn render_help_overlay(frame: &mut Frame, area: Rect, pal: Palette) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "SkiRank Terminal - Aiuto",
        "",
        "Globali:",
        "  1-6 / Tab      Pagine",
        "  j/k o ↑/↓      Muovi selezione",
        "  Enter          Apri",
        "  b / Esc        Indietro",
        "  *              Aggiungi/rimuovi preferito",
        "  n              Carica altri",
        "  R              Ricarica",
        "  :              Vai a route (es. athlete-6190001)",
        "  a              Accedi / Esci",
        "  t              Tema chiaro/scuro",
        "  ?              Aiuto",
        "  q              Esci",
        "",
        "Discipline (Atleti, Gare):",
        "  S SL  G GS  U SG  D DH  T DHTR  A AC",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Aiuto").borders(Borders::ALL))
        .style(pal.base);
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
