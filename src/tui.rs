use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
};
use std::io::stdout;
use std::sync::Arc;

use crate::models::{Candidate, CandidateField, CandidateId, NewCandidate, Stage, ViewMode};
use crate::ordered_set::OrderedSet;
use crate::store::{CandidateStore, StoreState};
use crate::view::{SelectionSummary, ViewCache, next_sort, project_row, select_all_target};

const RATING_STEP: f64 = 0.5;
const MAX_RATING: f64 = 5.0;

const NORMAL_HELP: &str = " j/k:move  space:select a:all d:delete  +/-:rating  /:search  \
    1-9:sort s:unsort  c:columns v:view n:add  q:quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// UI-only state. None of this lives in the store.
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Normal,
    Search,
    Columns { index: usize },
    Add(AddForm),
}

#[derive(Debug, Clone, PartialEq)]
struct AddForm {
    name: String,
    email: String,
    stage: Stage,
    rating: String,
    applied_job: String,
    resume: String,
    focus: CandidateField,
    error: Option<String>,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            stage: Stage::New,
            rating: "0".to_string(),
            applied_job: String::new(),
            resume: String::new(),
            focus: CandidateField::Name,
            error: None,
        }
    }
}

impl AddForm {
    fn buffer(&mut self, field: CandidateField) -> Option<&mut String> {
        match field {
            CandidateField::Name => Some(&mut self.name),
            CandidateField::Email => Some(&mut self.email),
            CandidateField::Rating => Some(&mut self.rating),
            CandidateField::AppliedJob => Some(&mut self.applied_job),
            CandidateField::Resume => Some(&mut self.resume),
            CandidateField::Stage => None,
        }
    }

    fn shift_focus(&mut self, forward: bool) {
        let fields = CandidateField::ALL;
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else {
            (pos + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn value(&self, field: CandidateField) -> String {
        match field {
            CandidateField::Name => self.name.clone(),
            CandidateField::Email => self.email.clone(),
            CandidateField::Stage => format!("< {} >", self.stage),
            CandidateField::Rating => self.rating.clone(),
            CandidateField::AppliedJob => self.applied_job.clone(),
            CandidateField::Resume => self.resume.clone(),
        }
    }

    fn to_candidate(&self) -> Result<NewCandidate, String> {
        let rating = match self.rating.trim() {
            "" => 0.0,
            text => text
                .parse::<f64>()
                .map_err(|_| format!("rating '{}' is not a number", text))?,
        };
        Ok(NewCandidate {
            name: self.name.clone(),
            email: self.email.clone(),
            stage: self.stage.clone(),
            rating,
            applied_job: self.applied_job.clone(),
            resume: self.resume.clone(),
        })
    }
}

pub struct App {
    store: CandidateStore,
    cache: ViewCache,
    cursor: Option<CandidateId>,
    cursor_hint: usize,
    mode: Mode,
    status: Option<String>,
}

impl App {
    pub fn new(store: CandidateStore) -> Self {
        Self {
            store,
            cache: ViewCache::new(),
            cursor: None,
            cursor_hint: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    fn rows(&mut self) -> Arc<[Candidate]> {
        self.cache.get(self.store.state())
    }

    /// Row index of the cursor, re-anchoring it if its candidate left the view.
    fn resolve_cursor(&mut self, rows: &[Candidate]) -> Option<usize> {
        if rows.is_empty() {
            self.cursor = None;
            return None;
        }
        let idx = self
            .cursor
            .and_then(|id| rows.iter().position(|c| c.id == id))
            .unwrap_or_else(|| self.cursor_hint.min(rows.len() - 1));
        self.cursor = Some(rows[idx].id);
        self.cursor_hint = idx;
        Some(idx)
    }

    fn current(&mut self) -> Option<Candidate> {
        let rows = self.rows();
        let idx = self.resolve_cursor(&rows)?;
        Some(rows[idx].clone())
    }

    fn move_cursor(&mut self, down: bool) {
        let rows = self.rows();
        let Some(idx) = self.resolve_cursor(&rows) else { return };
        let next = if down {
            (idx + 1).min(rows.len() - 1)
        } else {
            idx.saturating_sub(1)
        };
        self.cursor = Some(rows[next].id);
        self.cursor_hint = next;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        // pin the cursor to a candidate before the view can change under it
        let rows = self.rows();
        self.resolve_cursor(&rows);

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }

        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => return self.handle_normal(key),
            Mode::Search => self.handle_search(key),
            Mode::Columns { index } => self.handle_columns(key, index),
            Mode::Add(form) => self.handle_add(key, form),
        }
        Flow::Continue
    }

    fn handle_normal(&mut self, key: KeyEvent) -> Flow {
        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),
            KeyCode::Char(' ') => {
                if let Some(c) = self.current() {
                    self.store.toggle_select(&c.email);
                }
            }
            KeyCode::Char('a') => {
                let rows = self.rows();
                let target = select_all_target(&rows, &self.store.state().selected_candidates);
                self.store.select_all(target);
            }
            KeyCode::Char('d') => {
                let rows = self.rows();
                let summary = SelectionSummary::new(&rows, &self.store.state().selected_candidates);
                if summary.any_selected {
                    let removed = self.store.delete_selected();
                    self.status = Some(format!("Deleted {} candidate(s)", removed));
                } else {
                    self.status = Some("Nothing selected".to_string());
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_rating(RATING_STEP),
            KeyCode::Char('-') => self.nudge_rating(-RATING_STEP),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char(ch @ '1'..='9') => {
                let n = ch as usize - '1' as usize;
                let field = self.store.state().visible_columns.as_slice().get(n).copied();
                if let Some(field) = field {
                    let sort = next_sort(self.store.state().sort_config, field);
                    self.store.set_sort_config(Some(sort));
                }
            }
            KeyCode::Char('s') => self.store.set_sort_config(None),
            KeyCode::Char('c') => self.mode = Mode::Columns { index: 0 },
            KeyCode::Char('v') => {
                let mode = self.store.state().view_mode.toggled();
                self.store.set_view_mode(mode);
            }
            KeyCode::Char('n') => self.mode = Mode::Add(AddForm::default()),
            _ => {}
        }
        Flow::Continue
    }

    fn nudge_rating(&mut self, delta: f64) {
        if let Some(c) = self.current() {
            let rating = (c.rating + delta).clamp(0.0, MAX_RATING);
            self.store.update_rating(&c.email, rating);
        }
    }

    fn handle_search(&mut self, key: KeyEvent) {
        let mut term = self.store.state().search_term.clone();
        match key.code {
            KeyCode::Esc | KeyCode::Enter => return,
            KeyCode::Backspace => {
                term.pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => term.push(ch),
            _ => {}
        }
        self.store.set_search_term(&term);
        self.mode = Mode::Search;
    }

    fn handle_columns(&mut self, key: KeyEvent, index: usize) {
        let last = CandidateField::ALL.len() - 1;
        let index = match key.code {
            KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('q') => return,
            KeyCode::Char('A') => {
                self.store.set_visible_columns(CandidateField::ALL.to_vec());
                return;
            }
            KeyCode::Char('N') => {
                self.store.set_visible_columns(Vec::new());
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => (index + 1).min(last),
            KeyCode::Up | KeyCode::Char('k') => index.saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.store.toggle_column(CandidateField::ALL[index]);
                index
            }
            _ => index,
        };
        self.mode = Mode::Columns { index };
    }

    fn handle_add(&mut self, key: KeyEvent, mut form: AddForm) {
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => match form.to_candidate() {
                Ok(candidate) => {
                    let name = candidate.name.clone();
                    match self.store.add_candidate(candidate) {
                        Ok(id) => {
                            self.cursor = Some(id);
                            self.status = Some(format!("Added {}", name));
                            return;
                        }
                        Err(err) => form.error = Some(err.to_string()),
                    }
                }
                Err(err) => form.error = Some(err),
            },
            KeyCode::Tab | KeyCode::Down => form.shift_focus(true),
            KeyCode::BackTab | KeyCode::Up => form.shift_focus(false),
            KeyCode::Left if form.focus == CandidateField::Stage => form.stage = form.stage.prev(),
            KeyCode::Right if form.focus == CandidateField::Stage => form.stage = form.stage.next(),
            KeyCode::Backspace => {
                if let Some(buf) = form.buffer(form.focus) {
                    buf.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(buf) = form.buffer(form.focus) {
                    buf.push(ch);
                }
            }
            _ => {}
        }
        self.mode = Mode::Add(form);
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let rows = self.rows();
        let cursor = self.resolve_cursor(&rows);
        let state = self.store.snapshot();

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let summary = SelectionSummary::new(&rows, &state.selected_candidates);
        let header = Line::from(vec![
            Span::styled(" Talent Pool ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                " {} shown · {} selected · Columns ({}/{})",
                summary.visible,
                summary.selected,
                state.visible_columns.len(),
                CandidateField::ALL.len()
            )),
        ]);
        frame.render_widget(Paragraph::new(header), chunks[0]);

        let search_style = if self.mode == Mode::Search {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let search = Paragraph::new(state.search_term.as_str())
            .style(search_style)
            .block(Block::default().borders(Borders::ALL).title(" Search "));
        frame.render_widget(search, chunks[1]);

        match state.view_mode {
            ViewMode::Table => draw_table(frame, chunks[2], &state, &rows, cursor, summary),
            ViewMode::Sheet => draw_sheet(frame, chunks[2], &state, &rows, cursor),
        }

        let help = match (&self.mode, &self.status) {
            (Mode::Normal, Some(status)) => format!(" {}", status),
            (Mode::Normal, None) => NORMAL_HELP.to_string(),
            (Mode::Search, _) => " type to filter  enter/esc:done".to_string(),
            (Mode::Columns { .. }, _) => {
                " j/k:move  space:toggle  A:all N:none  esc:close".to_string()
            }
            (Mode::Add(_), _) => {
                " tab:next field  ←/→:stage  enter:add  esc:cancel".to_string()
            }
        };
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );

        match &self.mode {
            Mode::Columns { index } => draw_column_menu(frame, &state.visible_columns, *index),
            Mode::Add(form) => draw_add_form(frame, form),
            _ => {}
        }
    }
}

fn checkbox(on: bool) -> &'static str {
    if on { "[x]" } else { "[ ]" }
}

fn stars(rating: f64) -> String {
    let r = rating.clamp(0.0, MAX_RATING);
    let full = r.floor() as usize;
    let half = r - r.floor() >= 0.5;
    let empty = 5 - full - usize::from(half);
    format!(
        "{}{}{} {}",
        "★".repeat(full),
        if half { "½" } else { "" },
        "☆".repeat(empty),
        rating
    )
}

fn cell_text(candidate: &Candidate, field: CandidateField, text: String) -> String {
    match field {
        CandidateField::Rating => stars(candidate.rating),
        _ => text,
    }
}

fn draw_table(
    frame: &mut Frame,
    area: Rect,
    state: &StoreState,
    rows: &[Candidate],
    cursor: Option<usize>,
    summary: SelectionSummary,
) {
    let columns = state.visible_columns.as_slice();

    let mut header_cells = vec![Cell::from(checkbox(summary.all_selected))];
    for (i, field) in columns.iter().enumerate() {
        let arrow = match state.sort_config {
            Some(sort) if sort.key == *field => sort.direction.arrow(),
            _ => "",
        };
        header_cells.push(Cell::from(format!("{} {}{}", i + 1, field.label(), arrow)));
    }
    let header = Row::new(header_cells).style(Style::default().add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows
        .iter()
        .map(|c| {
            let selected = state.is_selected(&c.email);
            let mut cells = vec![Cell::from(checkbox(selected))];
            for (field, text) in columns.iter().zip(project_row(c, columns)) {
                cells.push(Cell::from(cell_text(c, *field, text)));
            }
            let style = if selected {
                Style::default().bg(Color::Blue)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(3)];
    widths.extend(columns.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Candidates ({}) ", rows.len())),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    table_state.select(cursor);
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn draw_sheet(
    frame: &mut Frame,
    area: Rect,
    state: &StoreState,
    rows: &[Candidate],
    cursor: Option<usize>,
) {
    let width = area.width.saturating_sub(6).max(10) as usize;
    let items: Vec<ListItem> = rows
        .iter()
        .map(|c| {
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("{} ", checkbox(state.is_selected(&c.email)))),
                Span::styled(c.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", c.stage), stage_style(&c.stage)),
            ])];
            let details = format!(
                "{} · {} · {}",
                c.email,
                if c.applied_job.is_empty() { "-" } else { c.applied_job.as_str() },
                stars(c.rating)
            );
            for line in textwrap::fill(&details, width).lines() {
                lines.push(Line::from(format!("    {}", line)));
            }
            if !c.resume.is_empty() {
                for line in textwrap::fill(&c.resume, width).lines() {
                    lines.push(Line::from(Span::styled(
                        format!("    {}", line),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Candidates ({}) ", rows.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(cursor);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn stage_style(stage: &Stage) -> Style {
    match stage {
        Stage::New => Style::default().fg(Color::Green),
        Stage::Interview => Style::default().fg(Color::Yellow),
        Stage::Hired => Style::default().fg(Color::Cyan),
        Stage::Rejected => Style::default().fg(Color::Red),
        Stage::Other(_) => Style::default(),
    }
}

fn popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_column_menu(frame: &mut Frame, visible: &OrderedSet<CandidateField>, index: usize) {
    let area = popup(frame.area(), 30, CandidateField::ALL.len() as u16 + 2);
    let items: Vec<ListItem> = CandidateField::ALL
        .iter()
        .map(|f| ListItem::new(format!("{} {}", checkbox(visible.contains(f)), f.label())))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Columns "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default();
    list_state.select(Some(index));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_add_form(frame: &mut Frame, form: &AddForm) {
    let area = popup(frame.area(), 60, CandidateField::ALL.len() as u16 + 4);
    let mut lines: Vec<Line> = CandidateField::ALL
        .iter()
        .map(|&f| {
            let marker = if f == form.focus { ">" } else { " " };
            let style = if f == form.focus {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(
                format!("{} {:<12} {}", marker, f.label(), form.value(f)),
                style,
            ))
        })
        .collect();
    if let Some(err) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(Color::Red))));
    }
    let dialog = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Add Talent "))
        .wrap(Wrap { trim: false });
    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

pub fn run_browse(store: CandidateStore) -> Result<()> {
    let mut app = App::new(store);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    tracing::info!(
        remaining = app.store().state().candidates.len(),
        "browse session ended"
    );
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) == Flow::Quit {
                break;
            }
        }
    }
    Ok(())
}
