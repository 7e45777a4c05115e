// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod session;

use anyhow::{Context, Result};
use cinelist_app::{
    CatalogEvent, CatalogSource, CatalogState, CatalogView, DetailField, DetailState, Selection,
    TitleSummary,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub use session::Session;

const PAGE_ROWS: isize = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_TTL: Duration = Duration::from_secs(4);
const APP_TITLE: &str = "cinelist";
const LIST_HEADER: &str = "Movie List";
const SEARCH_PLACEHOLDER: &str = "Search for a movie";
const NO_MOVIES: &str = "No movies found!";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: usize,
    status: Option<String>,
    status_token: u64,
    tick: usize,
}

pub fn run_app<S: CatalogSource + 'static>(session: &mut Session<S>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let catalog_events = session.subscribe();
    session.initialize();
    info!("terminal session started");

    let mut result = Ok(());
    loop {
        session.pump();
        process_catalog_events(
            session.state(),
            &mut view_data,
            &internal_tx,
            &catalog_events,
        );
        process_internal_events(&mut view_data, &internal_rx);
        view_data.tick = view_data.tick.wrapping_add(1);

        if let Err(error) = terminal.draw(|frame| render(frame, session.state(), &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(session, &mut view_data, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!("terminal session ended");
    result
}

fn process_catalog_events(
    state: &CatalogState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<CatalogEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            CatalogEvent::TitlesFailed(error) => {
                emit_status(view_data, tx, format!("could not load movies: {error}"));
            }
            CatalogEvent::DetailFailed { id, error, .. } => {
                emit_status(view_data, tx, format!("could not load movie {id}: {error}"));
            }
            CatalogEvent::QueryRejected => {
                emit_status(
                    view_data,
                    tx,
                    "search is locked while a movie is open; esc to go back",
                );
            }
            CatalogEvent::SelectionRejected(id) => {
                emit_status(view_data, tx, format!("movie {id} is not in the list"));
            }
            CatalogEvent::TitlesLoaded { total } => {
                debug!(total, "title list ready");
            }
            _ => {}
        }
    }
    clamp_cursor(view_data, state.displayed().len());
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_TTL);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the user asked to quit.
fn handle_key_event<S: CatalogSource + 'static>(
    session: &mut Session<S>,
    view_data: &mut ViewData,
    key: KeyEvent,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => return true,
            KeyCode::Char('r') => {
                session.retry();
            }
            _ => {}
        }
        return false;
    }

    if session.state().input_locked() {
        handle_detail_key(session, key);
        return false;
    }

    let len = session.state().displayed().len();
    match key.code {
        KeyCode::Char(ch) => {
            let mut query = session.state().query().to_owned();
            query.push(ch);
            edit_query(session, view_data, query);
        }
        KeyCode::Backspace => {
            let mut query = session.state().query().to_owned();
            if query.pop().is_some() {
                edit_query(session, view_data, query);
            }
        }
        KeyCode::Esc => {
            if !session.state().query().is_empty() {
                edit_query(session, view_data, String::new());
            }
        }
        KeyCode::Up => move_cursor(view_data, len, -1),
        KeyCode::Down => move_cursor(view_data, len, 1),
        KeyCode::PageUp => move_cursor(view_data, len, -PAGE_ROWS),
        KeyCode::PageDown => move_cursor(view_data, len, PAGE_ROWS),
        KeyCode::Home => view_data.cursor = 0,
        KeyCode::End => view_data.cursor = len.saturating_sub(1),
        KeyCode::Enter => {
            if let Some(item) = session.state().displayed().get(view_data.cursor) {
                let id = item.id.clone();
                session.select_item(id);
            }
        }
        _ => {}
    }
    false
}

fn handle_detail_key<S: CatalogSource + 'static>(session: &mut Session<S>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Left => {
            session.go_back();
        }
        KeyCode::Enter => {
            let failed = session
                .state()
                .selection()
                .filter(|selection| matches!(selection.detail, DetailState::Failed(_)))
                .map(|selection| selection.id.clone());
            if let Some(id) = failed {
                session.select_item(id);
            }
        }
        KeyCode::Char(ch) => {
            // Rejected by the store; surfaces as a status message.
            let query = format!("{}{ch}", session.state().query());
            session.set_query(query);
        }
        KeyCode::Backspace => {
            let mut query = session.state().query().to_owned();
            query.pop();
            session.set_query(query);
        }
        _ => {}
    }
}

fn edit_query<S: CatalogSource + 'static>(
    session: &mut Session<S>,
    view_data: &mut ViewData,
    query: String,
) {
    session.set_query(query);
    view_data.cursor = 0;
}

fn move_cursor(view_data: &mut ViewData, len: usize, delta: isize) {
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    view_data.cursor = view_data.cursor.saturating_add_signed(delta).min(len - 1);
}

fn clamp_cursor(view_data: &mut ViewData, len: usize) {
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

/// First row to draw so the cursor stays inside a window of `height` rows.
fn window_start(len: usize, cursor: usize, height: usize) -> usize {
    if height == 0 || cursor < height {
        return 0;
    }
    (cursor + 1 - height).min(len.saturating_sub(height))
}

fn render(frame: &mut ratatui::Frame<'_>, state: &CatalogState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().title(APP_TITLE).borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let search_style = if state.query().is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let search = Paragraph::new(search_text(state))
        .style(search_style)
        .block(
            Block::default()
                .title(search_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(search, layout[1]);

    match state.view() {
        CatalogView::Browsing(titles) => {
            render_title_list(frame, layout[2], state, titles, view_data);
        }
        view => {
            let title = if matches!(view, CatalogView::Detail(_)) {
                "details"
            } else {
                "movies"
            };
            let body = Paragraph::new(body_text(view, view_data.tick))
                .wrap(Wrap { trim: false })
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(body, layout[2]);
        }
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[3]);
}

fn render_title_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &CatalogState,
    titles: &[TitleSummary],
    view_data: &ViewData,
) {
    let height = usize::from(area.height.saturating_sub(2));
    let start = window_start(titles.len(), view_data.cursor, height);

    let rows = titles
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, item)| {
            let style = if index == view_data.cursor {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![Cell::from(item.title.clone())]).style(style)
        });

    let table = Table::new(rows, [Constraint::Min(8)]).block(
        Block::default()
            .title(list_title(state))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn header_text(state: &CatalogState) -> String {
    match state.locked_title() {
        Some(title) => format!("{LIST_HEADER} › {title}"),
        None => LIST_HEADER.to_owned(),
    }
}

fn search_text(state: &CatalogState) -> String {
    if state.query().is_empty() {
        SEARCH_PLACEHOLDER.to_owned()
    } else {
        state.query().to_owned()
    }
}

fn search_title(state: &CatalogState) -> &'static str {
    if state.input_locked() {
        "search (locked)"
    } else {
        "search"
    }
}

fn list_title(state: &CatalogState) -> String {
    let shown = state.displayed().len();
    let total = state.full().len();
    if shown == total {
        format!("movies ({total})")
    } else {
        format!("movies ({shown}/{total})")
    }
}

fn body_text(view: CatalogView<'_>, tick: usize) -> String {
    let spinner = SPINNER[tick % SPINNER.len()];
    match view {
        CatalogView::Loading => format!("{spinner} loading movies…"),
        CatalogView::LoadFailed(error) => {
            format!("could not load movies: {error}\n\nctrl+r to retry")
        }
        CatalogView::NoMatches => NO_MOVIES.to_owned(),
        CatalogView::Browsing(titles) => titles
            .iter()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        CatalogView::Detail(selection) => render_detail_text(selection, spinner),
    }
}

fn render_detail_text(selection: &Selection, spinner: &str) -> String {
    match &selection.detail {
        DetailState::Pending => format!("{}\n\n{spinner} loading detail…", selection.title),
        DetailState::Failed(error) => format!(
            "{}\n\ncould not load detail: {error}\n\nenter to retry | esc to go back",
            selection.title
        ),
        DetailState::Loaded(detail) => {
            let title = if detail.title.trim().is_empty() {
                selection.title.as_str()
            } else {
                detail.title.as_str()
            };
            let width = DetailField::ALL
                .iter()
                .map(|field| field.label().len())
                .max()
                .unwrap_or(0);

            let mut lines = vec![title.to_owned(), String::new()];
            lines.extend(
                detail
                    .rows()
                    .into_iter()
                    .map(|(field, value)| format!("{:<width$}  {value}", field.label())),
            );
            lines.join("\n")
        }
    }
}

fn status_text(state: &CatalogState, view_data: &ViewData) -> String {
    let (mode, hints) = match state.view() {
        CatalogView::Detail(_) => ("DETAIL", "esc/← back | enter retry | ctrl+q quit"),
        CatalogView::LoadFailed(_) => ("ERROR", "ctrl+r retry | ctrl+q quit"),
        _ => (
            "BROWSE",
            "type to search | ↑/↓ pgup/pgdn home/end | enter open | esc clear | ctrl+q quit",
        ),
    };
    match &view_data.status {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}
