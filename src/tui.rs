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

use crate::api::{ApiClient, Transport};
use crate::models::{
    display_date, display_datetime, Interview, Placement, PlacementStatus, SelectionRecord,
    UpdateType,
};

/// Interviews and selections of the highlighted placement. Fetched lazily
/// when the cursor lands on a placement.
#[derive(Default)]
struct Detail {
    placement_id: String,
    interviews: Vec<Interview>,
    selections: Vec<SelectionRecord>,
    errors: Vec<String>,
}

struct AppState {
    placements: Vec<Placement>,
    selected: usize,
    scroll_offset: u16,
    list_error: Option<String>,
    detail: Detail,
}

impl AppState {
    fn new() -> Self {
        Self {
            placements: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            list_error: None,
            detail: Detail::default(),
        }
    }

    fn current(&self) -> Option<&Placement> {
        self.placements.get(self.selected)
    }

    /// Refetch everything. Failures are kept for display; the browser stays open.
    fn reload<T: Transport>(&mut self, client: &ApiClient<T>) {
        match client.list_placements() {
            Ok(placements) => {
                self.placements = placements;
                self.list_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "placement list fetch failed");
                self.placements.clear();
                self.list_error = Some(e.user_message("Could not load placements."));
            }
        }
        if self.selected >= self.placements.len() {
            self.selected = self.placements.len().saturating_sub(1);
        }
        self.detail = Detail::default();
        self.load_detail(client);
    }

    fn load_detail<T: Transport>(&mut self, client: &ApiClient<T>) {
        let Some(id) = self.current().map(|p| p.id.clone()) else {
            self.detail = Detail::default();
            return;
        };
        if self.detail.placement_id == id {
            return;
        }

        let mut detail = Detail { placement_id: id.clone(), ..Detail::default() };
        match client.list_interviews(&id) {
            Ok(interviews) => detail.interviews = interviews,
            Err(e) => detail.errors.push(e.user_message("Failed to load interviews.")),
        }
        match client.list_selections(&id) {
            Ok(selections) => detail.selections = selections,
            Err(e) => detail.errors.push(e.user_message("Failed to load selections.")),
        }
        self.detail = detail;
    }

    fn next(&mut self) {
        if !self.placements.is_empty() && self.selected < self.placements.len() - 1 {
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

pub fn run_browse<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    let mut state = AppState::new();
    state.reload(client);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, client);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<T: Transport>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    client: &ApiClient<T>,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let prev_selected = state.selected;
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('r') => {
                    state.reload(client);
                    list_state.select(Some(state.selected));
                }
                _ => {}
            }
            if state.selected != prev_selected {
                list_state.select(Some(state.selected));
                state.load_detail(client);
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    let items: Vec<ListItem> = state
        .placements
        .iter()
        .map(|p| {
            let icon = match p.status {
                Some(PlacementStatus::Ongoing) => "*",
                Some(PlacementStatus::Completed) => "-",
                _ => " ",
            };
            ListItem::new(format!(
                "{} {} | {}",
                icon,
                clip(&p.title, 32),
                clip(&p.company.name, 20)
            ))
        })
        .collect();

    let title = match &state.list_error {
        Some(_) => " Placements (error) ".to_string(),
        None => format!(" Placements ({}) ", state.placements.len()),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    let detail_widget = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let help = Paragraph::new(" j/k:navigate  J/K:scroll  r:refresh  q:quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn dim(text: String) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn field(lines: &mut Vec<Line<'static>>, label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        lines.push(Line::from(format!("{}: {}", label, v)));
    }
}

fn build_detail(state: &AppState) -> Text<'static> {
    if let Some(err) = &state.list_error {
        return Text::from(vec![
            Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))),
            Line::from(""),
            dim("Press r to try again.".to_string()),
        ]);
    }
    let Some(p) = state.current() else {
        return Text::raw("No placements found.");
    };

    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(heading(&p.title));
    lines.push(Line::from(format!("{} - {}", p.company.name, p.job_designation)));
    let status = p.status.unwrap_or_default();
    let status_style = match status {
        PlacementStatus::Upcoming => Style::default().fg(Color::Green),
        PlacementStatus::Ongoing => Style::default().fg(Color::Yellow),
        PlacementStatus::Completed => Style::default().fg(Color::DarkGray),
        PlacementStatus::Unknown => Style::default().fg(Color::Gray),
    };
    lines.push(Line::from(Span::styled(format!("Status: {}", status), status_style)));
    lines.push(Line::from(""));

    field(&mut lines, "CTC", Some(&p.ctc_details));
    field(&mut lines, "Batches", Some(&p.batches.join(", ")));
    field(&mut lines, "Branches", Some(&p.eligible_branches.join(", ")));
    field(&mut lines, "Location", p.location.as_deref());
    field(&mut lines, "Mode", p.mode_of_recruitment.as_deref());
    field(&mut lines, "Drive date", p.tentative_drive_date.as_deref().map(display_date).as_deref());
    field(&mut lines, "Deadline", p.application_deadline.as_deref().map(display_date).as_deref());
    field(&mut lines, "Rounds", Some(&p.drive_rounds.join(", ")));
    field(&mut lines, "Apply", p.apply_link.as_deref());
    field(&mut lines, "Website", p.company.website.as_deref());
    lines.push(Line::from(""));

    lines.push(heading(&format!("Updates ({})", p.updates.len())));
    if p.updates.is_empty() {
        lines.push(dim("  No updates yet.".to_string()));
    }
    for u in &p.updates {
        let color = match u.update_type {
            UpdateType::Alert => Color::Red,
            UpdateType::Reminder => Color::Yellow,
            UpdateType::Info => Color::Cyan,
            UpdateType::Unknown => Color::Gray,
        };
        let when = u.created_at.as_deref().map(display_datetime).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(format!("  [{}] ", u.update_type), Style::default().fg(color)),
            Span::styled(when, Style::default().fg(Color::DarkGray)),
        ]));
        for line in textwrap::fill(&u.message, 70).lines() {
            lines.push(Line::from(format!("    {}", line)));
        }
    }
    lines.push(Line::from(""));

    let detail = &state.detail;
    for err in &detail.errors {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }

    lines.push(heading(&format!("Interviews ({})", detail.interviews.len())));
    for iv in &detail.interviews {
        let d = &iv.details;
        lines.push(Line::from(format!(
            "  {} {}-{} ({})",
            display_date(&d.interview_date),
            d.start_time,
            d.end_time,
            d.mode
        )));
        if let Some(link) = &d.meeting_link {
            lines.push(dim(format!("    {}", link)));
        }
    }
    lines.push(Line::from(""));

    lines.push(heading(&format!("Selections ({})", detail.selections.len())));
    for record in &detail.selections {
        for s in &record.data.selected_students {
            lines.push(Line::from(format!("  {} ({}, {})", s.name, s.rollno, s.branch)));
        }
        for step in &record.data.next_steps {
            lines.push(dim(format!("    next: {}", step)));
        }
    }

    if !p.notes.is_empty() {
        lines.push(Line::from(""));
        lines.push(heading("Notes"));
        for note in &p.notes {
            for line in textwrap::fill(note, 70).lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
    }

    Text::from(lines)
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
