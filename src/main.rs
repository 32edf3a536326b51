use std::fs::OpenOptions;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use env_logger::{Builder, Env, Target};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use eliteserien_terminal::config::Config;
use eliteserien_terminal::provider::{GraphQlSource, spawn_provider};
use eliteserien_terminal::season::{SeasonRange, SeasonRow};
use eliteserien_terminal::standings::{StandingsRow, StatCode};
use eliteserien_terminal::state::{
    AppState, Delta, Focus, LoadStatus, ProviderCommand, apply_delta,
};

/// Screen rows of the standings list from the last draw, for mouse hits.
#[derive(Debug, Clone, Copy, Default)]
struct StandingsHit {
    area: Rect,
    start: usize,
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
    hit: StandingsHit,
}

impl App {
    fn new(cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            cmd_tx,
            hit: StandingsHit::default(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Tab => self.state.toggle_focus(),
            KeyCode::Char('s') => self.state.cycle_focused_sort(),
            KeyCode::Enter => {
                let cmd = self.state.select_current(SeasonRange::current());
                self.send(cmd);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                let cmd = self.state.retry_standings();
                self.send(cmd);
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.state.help_overlay || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let area = self.hit.area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x + area.width
            && mouse.row >= area.y
            && mouse.row < area.y + area.height;
        if !inside {
            return;
        }
        let idx = self.hit.start + (mouse.row - area.y) as usize;
        if idx >= self.state.standings.len() {
            return;
        }
        self.state.focus = Focus::Standings;
        self.state.selected = idx;
        let cmd = self.state.select_current(SeasonRange::current());
        self.send(cmd);
    }

    fn maybe_request_standings(&mut self) {
        let cmd = self.state.request_standings();
        self.send(cmd);
    }

    fn send(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        if self.cmd_tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Provider unavailable, request dropped");
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    init_logging(&config)?;
    log::info!("starting against {}", config.endpoint);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(GraphQlSource::new(config), tx, cmd_rx);

    let mut app = App::new(cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("ui loop failed: {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_request_standings();

        terminal.draw(|f| app.hit = ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) -> StandingsHit {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let hit = render_standings(frame, chunks[1], state);
    render_season(frame, chunks[2], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[3]);

    let footer = Paragraph::new(
        "j/k/↑/↓ Move | Enter/click Season | Tab Focus | s Sort panel | r Retry | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[4]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    hit
}

fn header_text(state: &AppState) -> String {
    let title = state.stage_name.as_deref().unwrap_or("Eliteserien");
    format!("{title} | Sort: {}", state.sort.label())
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn status_suffix(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Idle | LoadStatus::Loaded => "",
        LoadStatus::Loading => " (loading)",
        LoadStatus::Failed => " (failed)",
    }
}

fn render_standings(frame: &mut Frame, area: Rect, state: &AppState) -> StandingsHit {
    let title = format!("League Table{}", status_suffix(state.standings_status));
    let block = panel_block(title, state.focus == Focus::Standings);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = standings_columns();
    let mut headers = vec!["Rank", "Team"];
    headers.extend(StatCode::ALL.iter().map(|code| code.header()));
    render_header(frame, sections[0], &widths, &headers);

    let list_area = sections[1];
    let rows = state.standings_view();
    if rows.is_empty() {
        let empty = Paragraph::new(standings_empty_message(state.standings_status)).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return StandingsHit::default();
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let row = rows[idx];
        let selected = idx == state.selected;
        let is_active = state.active_team_id.as_deref() == Some(row.id.as_str());
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        for (col, text) in cols.iter().zip(standings_cells(row)) {
            render_cell_text(frame, *col, &text, style);
        }
    }

    StandingsHit {
        area: Rect {
            height: (end - start) as u16,
            ..list_area
        },
        start,
    }
}

fn standings_empty_message(status: LoadStatus) -> &'static str {
    match status {
        LoadStatus::Failed => "Standings unavailable, press r to retry",
        LoadStatus::Loaded => "No teams in this table",
        LoadStatus::Idle | LoadStatus::Loading => "Loading standings...",
    }
}

fn standings_cells(row: &StandingsRow) -> Vec<String> {
    let mut cells = vec![row.rank.to_string(), row.team.clone()];
    cells.extend(StatCode::ALL.iter().map(|code| format_stat(row.stat(*code))));
    cells
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn render_season(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = format!(
        "{}{} | Sort: {}",
        state.season_heading(),
        status_suffix(state.season_status),
        state.season_sort.label()
    );
    let block = panel_block(title, state.focus == Focus::Season);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = season_columns();
    render_header(frame, sections[0], &widths, &["Date", "Opponent", "Stage"]);

    let list_area = sections[1];
    if state.season.is_empty() {
        let msg = match (&state.active_team, state.season_status) {
            (None, _) => "",
            (Some(_), LoadStatus::Loading) => "Loading matches...",
            (Some(_), LoadStatus::Failed) => "Matches unavailable",
            (Some(_), _) => "No matches this season",
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let rows = state.season_view();
    let visible = list_area.height as usize;
    let total = rows.len();
    let max_start = total.saturating_sub(visible);
    let start = (state.season_scroll as usize).min(max_start);
    let end = (start + visible).min(total);
    for (i, row) in rows[start..end].iter().enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        for (col, text) in cols.iter().zip(season_cells(row)) {
            render_cell_text(frame, *col, text, Style::default());
        }
    }
}

fn season_cells(row: &SeasonRow) -> [&str; 3] {
    [row.date.as_str(), row.opponent.as_str(), row.stage.as_str()]
}

fn standings_columns() -> [Constraint; 9] {
    [
        Constraint::Length(5),
        Constraint::Min(18),
        Constraint::Length(9),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(7),
    ]
}

fn season_columns() -> [Constraint; 3] {
    [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Min(16),
    ]
}

fn render_header(frame: &mut Frame, area: Rect, widths: &[Constraint], labels: &[&str]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (col, label) in cols.iter().zip(labels) {
        render_cell_text(frame, *col, label, style);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
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

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Eliteserien Terminal - Help",
        "",
        "  j/k or ↑/↓   Move in table / scroll matches",
        "  Enter        Show the selected team's season",
        "  Click        Select a team row",
        "  Tab          Switch focus between panels",
        "  s            Cycle sort column of the focused panel",
        "  r            Retry a failed standings load",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
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

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use eliteserien_terminal::state::{SeasonSort, SortMode};

    #[test]
    fn visible_range_keeps_selection_centered() {
        assert_eq!(visible_range(0, 0, 5), (0, 0));
        assert_eq!(visible_range(3, 4, 10), (0, 4));
        assert_eq!(visible_range(10, 16, 6), (7, 13));
        assert_eq!(visible_range(15, 16, 6), (10, 16));
    }

    #[test]
    fn empty_loaded_table_is_not_reported_as_loading() {
        assert_eq!(
            standings_empty_message(LoadStatus::Loaded),
            "No teams in this table"
        );
        assert_eq!(
            standings_empty_message(LoadStatus::Loading),
            "Loading standings..."
        );
        assert_eq!(
            standings_empty_message(LoadStatus::Failed),
            "Standings unavailable, press r to retry"
        );
    }

    fn click_app() -> (App, mpsc::Receiver<ProviderCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let mut app = App::new(cmd_tx);
        app.state.standings = vec![StandingsRow::new("t1", "Molde", 1)];
        app.hit = StandingsHit {
            area: Rect::new(2, 5, 40, 1),
            start: 0,
        };
        (app, cmd_rx)
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn click_on_row_requests_season() {
        let (mut app, cmd_rx) = click_app();
        app.on_mouse(left_click(4, 5));
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(ProviderCommand::FetchSeason { ref participant_id, .. }) if participant_id == "t1"
        ));
    }

    #[test]
    fn click_under_help_overlay_is_ignored() {
        let (mut app, cmd_rx) = click_app();
        app.state.help_overlay = true;
        app.on_mouse(left_click(4, 5));
        assert!(cmd_rx.try_recv().is_err());
        assert!(app.state.active_team.is_none());
    }

    #[test]
    fn s_key_sorts_the_focused_panel() {
        let (mut app, _cmd_rx) = click_app();
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        assert_eq!(app.state.sort, SortMode::Points);
        assert_eq!(app.state.season_sort, SeasonSort::Api);

        app.on_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE));
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        assert_eq!(app.state.sort, SortMode::Points);
        assert_eq!(app.state.season_sort, SeasonSort::Date);
    }

    #[test]
    fn stats_render_whole_numbers_plainly() {
        assert_eq!(format_stat(Some(60.0)), "60");
        assert_eq!(format_stat(Some(1.5)), "1.5");
        assert_eq!(format_stat(None), "-");
    }
}
