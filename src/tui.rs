use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::watch;

use applog::debounce::Debouncer;
use applog::models::{format_date, format_salary};
use applog::{FilterUpdate, JobApplication, JobRepository, JobStatus, JobStore, JobUpdate};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
}

struct AppState<R> {
    store: JobStore<R>,
    selected: usize,
    scroll_offset: u16,
    mode: InputMode,
    search_input: String,
    search: Debouncer<String>,
    search_rx: watch::Receiver<String>,
    message: Option<String>,
}

impl<R: JobRepository> AppState<R> {
    fn new(store: JobStore<R>, debounce: Duration) -> Self {
        let search_input = store.filters().search.clone().unwrap_or_default();
        let search = Debouncer::new(search_input.clone(), debounce);
        let search_rx = search.subscribe();
        Self {
            store,
            selected: 0,
            scroll_offset: 0,
            mode: InputMode::Normal,
            search_input,
            search,
            search_rx,
            message: None,
        }
    }

    fn visible_len(&self) -> usize {
        self.store.sorted_jobs().len()
    }

    fn current_job(&self) -> Option<JobApplication> {
        self.store.sorted_jobs().get(self.selected).map(|job| (*job).clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn next(&mut self) {
        let len = self.visible_len();
        if len > 0 && self.selected < len - 1 {
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

    // setFilters falls back to newest when no sort is given, so carry the current one
    fn apply_filters(&mut self, mut update: FilterUpdate) {
        if update.sort.is_none() {
            update.sort = Some(self.store.filters().sort);
        }
        self.store.set_filters(update);
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn cycle_status_filter(&mut self) {
        let next = match self.store.filters().status {
            None => Some(JobStatus::Applied),
            Some(JobStatus::Applied) => Some(JobStatus::Interview),
            Some(JobStatus::Interview) => Some(JobStatus::Offer),
            Some(JobStatus::Offer) => Some(JobStatus::Rejected),
            Some(JobStatus::Rejected) => None,
        };
        self.apply_filters(FilterUpdate::status(next));
    }

    fn cycle_sort(&mut self) {
        let next = self.store.filters().sort.next();
        self.apply_filters(FilterUpdate::sort(next));
    }

    fn clear_filters(&mut self) {
        self.search.cancel();
        self.search_input.clear();
        self.store.clear_filters();
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn poll_search(&mut self) {
        if self.search_rx.has_changed().unwrap_or(false) {
            let term = self.search_rx.borrow_and_update().clone();
            let search = (!term.is_empty()).then_some(term);
            self.apply_filters(FilterUpdate::search(search));
        }
    }

    async fn set_status(&mut self, status: JobStatus) {
        let Some(job) = self.current_job() else { return };
        if job.status == status {
            return;
        }
        match self.store.update_job(&job.id, &JobUpdate::status(status)).await {
            Ok(updated) => {
                self.message = Some(format!("{} at {} is now {}", updated.position, updated.company, status));
            }
            Err(err) => self.message = Some(format!("Update failed: {}", err)),
        }
        self.clamp_selection();
    }

    async fn delete_current(&mut self) {
        let Some(job) = self.current_job() else { return };
        match self.store.delete_job(&job.id).await {
            Ok(()) => self.message = Some(format!("Deleted {} at {}", job.position, job.company)),
            Err(err) => self.message = Some(format!("Delete failed: {}", err)),
        }
        self.clamp_selection();
    }

    async fn refresh(&mut self) {
        self.store.invalidate();
        self.store.clear_error();
        self.store.fetch_jobs().await;
        self.message = match self.store.error() {
            Some(err) => Some(format!("Refresh failed: {}", err)),
            None => Some(format!("Loaded {} jobs", self.store.all_jobs().len())),
        };
        self.clamp_selection();
    }
}

pub async fn run_browse<R: JobRepository>(mut store: JobStore<R>, debounce: Duration) -> Result<()> {
    store.fetch_jobs().await;
    if let Some(err) = store.error() {
        anyhow::bail!("Failed to load jobs: {}", err);
    }

    let mut state = AppState::new(store, debounce);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop<R: JobRepository>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState<R>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        state.poll_search();
        list_state.select((state.visible_len() > 0).then_some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if !event::poll(POLL_INTERVAL)? {
            tokio::task::yield_now().await;
            continue;
        }

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if state.mode == InputMode::Search {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => state.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    state.search_input.pop();
                    state.search.update(state.search_input.clone());
                }
                KeyCode::Char(c) => {
                    state.search_input.push(c);
                    state.search.update(state.search_input.clone());
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => state.next(),
            KeyCode::Up | KeyCode::Char('k') => state.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
            KeyCode::Char('/') => state.mode = InputMode::Search,
            KeyCode::Char('s') => state.cycle_sort(),
            KeyCode::Char('f') => state.cycle_status_filter(),
            KeyCode::Char('c') => state.clear_filters(),
            KeyCode::Char('a') => state.set_status(JobStatus::Applied).await,
            KeyCode::Char('i') => state.set_status(JobStatus::Interview).await,
            KeyCode::Char('o') => state.set_status(JobStatus::Offer).await,
            KeyCode::Char('x') => state.set_status(JobStatus::Rejected).await,
            KeyCode::Char('d') => state.delete_current().await,
            KeyCode::Char('r') => state.refresh().await,
            _ => {}
        }
    }
    Ok(())
}

fn status_style(status: JobStatus) -> Style {
    match status {
        JobStatus::Applied => Style::default().fg(Color::Cyan),
        JobStatus::Interview => Style::default().fg(Color::Yellow),
        JobStatus::Offer => Style::default().fg(Color::Green),
        JobStatus::Rejected => Style::default().fg(Color::Red),
    }
}

fn draw<R: JobRepository>(frame: &mut Frame, state: &AppState<R>, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Header: filters and counts
    let filters = state.store.filters();
    let counts = state.store.job_counts();
    let search = match state.mode {
        InputMode::Search => format!("{}_", state.search_input),
        InputMode::Normal if state.search_input.is_empty() => "-".to_string(),
        InputMode::Normal => state.search_input.clone(),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::raw(format!(
            " status: {}  search: {}  sort: {}   ",
            filters.status.map(|s| s.as_str()).unwrap_or("all"),
            search,
            filters.sort
        )),
        Span::styled(format!("applied {} ", counts.applied), status_style(JobStatus::Applied)),
        Span::styled(format!("interview {} ", counts.interview), status_style(JobStatus::Interview)),
        Span::styled(format!("offer {} ", counts.offer), status_style(JobStatus::Offer)),
        Span::styled(format!("rejected {} ", counts.rejected), status_style(JobStatus::Rejected)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Filters "));
    frame.render_widget(header, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(60),
        ])
        .split(rows[1]);

    // Left panel: job list
    let jobs = state.store.sorted_jobs();
    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            let position = if job.position.chars().count() > 30 {
                format!("{}...", job.position.chars().take(27).collect::<String>())
            } else {
                job.position.clone()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<10}", job.status.as_str()), status_style(job.status)),
                Span::raw(format!("{} | {}", position, job.company)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Jobs ({}/{}) ", counts.total, state.store.all_jobs().len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = build_detail(jobs.get(state.selected).copied());
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer: last action result, else help
    let footer = match &state.message {
        Some(message) => Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(
            " j/k:navigate  /:search  s:sort  f:status  c:clear  a/i/o/x:set status  d:delete  r:refresh  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[2]);
}

fn build_detail(job: Option<&JobApplication>) -> Text<'static> {
    let Some(job) = job else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        job.position.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company)));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", job.status),
        status_style(job.status),
    )));
    lines.push(Line::from(format!("Applied: {}", format_date(job.date_applied))));
    lines.push(Line::from(format!("Location: {}", job.location)));
    if let Some(salary) = job.salary {
        lines.push(Line::from(format!("Salary: {}", format_salary(salary))));
    }
    if let Some(url) = &job.application_url {
        lines.push(Line::from(format!("URL: {}", url)));
    }

    match (&job.contact_person, &job.contact_email) {
        (Some(person), Some(email)) => lines.push(Line::from(format!("Contact: {} <{}>", person, email))),
        (Some(person), None) => lines.push(Line::from(format!("Contact: {}", person))),
        (None, Some(email)) => lines.push(Line::from(format!("Contact: {}", email))),
        (None, None) => {}
    }

    for (label, text) in [("Description", &job.description), ("Notes", &job.notes)] {
        let Some(text) = text else { continue };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            label,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(text, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}
