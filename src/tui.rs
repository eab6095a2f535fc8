use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::models::{ApplicationPatch, JobApplication, Status, StatusFilter};
use crate::store::Store;

struct BoardState {
    rows: Vec<JobApplication>,
    selected: usize,
    scroll_offset: u16,
    searching: bool,
}

impl BoardState {
    fn new(rows: Vec<JobApplication>) -> Self {
        Self {
            rows,
            selected: 0,
            scroll_offset: 0,
            searching: false,
        }
    }

    fn current(&self) -> Option<&JobApplication> {
        self.rows.get(self.selected)
    }

    fn refresh(&mut self, store: &Store) {
        self.rows = store.filtered_view();
        if self.rows.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.rows.len() {
            self.selected = self.rows.len() - 1;
        }
    }

    fn next(&mut self) {
        if !self.rows.is_empty() && self.selected < self.rows.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

pub fn run_board(store: &mut Store) -> Result<()> {
    let mut state = BoardState::new(store.filtered_view());

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, store);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut BoardState,
    store: &mut Store,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, store, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if state.searching {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter => state.searching = false,
                    KeyCode::Backspace => {
                        let mut query = store.search_query().to_string();
                        query.pop();
                        store.set_search_query(query);
                        state.refresh(store);
                    }
                    KeyCode::Char(c) => {
                        let mut query = store.search_query().to_string();
                        query.push(c);
                        store.set_search_query(query);
                        state.refresh(store);
                    }
                    _ => {}
                }
                list_state.select(Some(state.selected));
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('/') => state.searching = true,
                KeyCode::Char('f') => {
                    store.set_status_filter(next_filter(store.status_filter()));
                    state.refresh(store);
                }
                KeyCode::Char('a') => set_status(state, store, Status::Applied),
                KeyCode::Char('i') => set_status(state, store, Status::Interview),
                KeyCode::Char('o') => set_status(state, store, Status::Offer),
                KeyCode::Char('x') => set_status(state, store, Status::Rejected),
                KeyCode::Char('p') => set_status(state, store, Status::Pending),
                KeyCode::Char('d') => {
                    if let Some(app) = state.current() {
                        let id = app.id.clone();
                        store.remove(&id);
                        state.refresh(store);
                    }
                }
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn set_status(state: &mut BoardState, store: &mut Store, status: Status) {
    if let Some(app) = state.current() {
        let id = app.id.clone();
        store.update(&id, ApplicationPatch::status(status));
        state.refresh(store);
    }
}

fn next_filter(filter: StatusFilter) -> StatusFilter {
    match filter {
        StatusFilter::All => StatusFilter::Only(Status::Applied),
        StatusFilter::Only(Status::Applied) => StatusFilter::Only(Status::Interview),
        StatusFilter::Only(Status::Interview) => StatusFilter::Only(Status::Offer),
        StatusFilter::Only(Status::Offer) => StatusFilter::Only(Status::Rejected),
        StatusFilter::Only(Status::Rejected) => StatusFilter::Only(Status::Pending),
        StatusFilter::Only(Status::Pending) => StatusFilter::All,
    }
}

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Applied => "+",
        Status::Interview => "*",
        Status::Offer => "$",
        Status::Rejected => "x",
        Status::Pending => "~",
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Applied => Style::default().fg(Color::Cyan),
        Status::Interview => Style::default().fg(Color::Yellow),
        Status::Offer => Style::default().fg(Color::Green),
        Status::Rejected => Style::default().fg(Color::Red),
        Status::Pending => Style::default().fg(Color::DarkGray),
    }
}

fn draw(frame: &mut Frame, state: &BoardState, store: &Store, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(frame.area());

    // Left panel: filtered application list
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|app| {
            let position = if app.position.len() > 28 {
                format!("{}...", &app.position[..25])
            } else {
                app.position.clone()
            };
            ListItem::new(format!(
                "{} {} | {}",
                status_icon(app.status),
                position,
                app.company
            ))
        })
        .collect();

    let mut title = format!(
        " Applications ({}/{}) [{}] ",
        state.rows.len(),
        store.len(),
        store.status_filter()
    );
    if state.searching || !store.search_query().is_empty() {
        title.push_str(&format!("/{} ", store.search_query()));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: record detail
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = if state.searching {
        " type to search  Enter/Esc:done"
    } else {
        " j/k:navigate  a/i/o/x/p:status  d:delete  f:filter  /:search  q:quit"
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn build_detail<'a>(state: &'a BoardState) -> Text<'a> {
    let Some(app) = state.current() else {
        return Text::raw("No applications match the current filter");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        &app.position,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", app.company)));
    lines.push(Line::from(format!("Location: {}", app.location)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", app.status),
        status_style(app.status),
    )));

    lines.push(Line::from(format!("Applied: {}", app.date_applied)));
    lines.push(Line::from(format!("Updated: {}", app.last_updated)));

    if let Some(url) = &app.url {
        lines.push(Line::from(format!("URL: {}", url)));
    }
    if let Some(salary) = &app.salary {
        lines.push(Line::from(format!("Salary: {}", salary)));
    }
    match (&app.contact_name, &app.contact_email) {
        (Some(name), Some(email)) => {
            lines.push(Line::from(format!("Contact: {} <{}>", name, email)));
        }
        (Some(name), None) => lines.push(Line::from(format!("Contact: {}", name))),
        (None, Some(email)) => lines.push(Line::from(format!("Contact: {}", email))),
        (None, None) => {}
    }

    if let Some(notes) = &app.notes {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}
