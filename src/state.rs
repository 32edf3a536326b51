use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::FetchError;
use crate::season::{SeasonBatch, SeasonRange, SeasonRow};
use crate::standings::{StandingsRow, StandingsTable};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Standings,
    Season,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Table,
    Points,
    Wins,
    GoalsFor,
    GoalsAgainst,
    GoalDifference,
    Team,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            Self::Table => Self::Points,
            Self::Points => Self::Wins,
            Self::Wins => Self::GoalsFor,
            Self::GoalsFor => Self::GoalsAgainst,
            Self::GoalsAgainst => Self::GoalDifference,
            Self::GoalDifference => Self::Team,
            Self::Team => Self::Table,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "TABLE",
            Self::Points => "POINTS",
            Self::Wins => "WON",
            Self::GoalsFor => "SCORED",
            Self::GoalsAgainst => "CONCEDED",
            Self::GoalDifference => "GD",
            Self::Team => "TEAM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonSort {
    Api,
    Date,
    Opponent,
    Stage,
}

impl SeasonSort {
    pub fn next(self) -> Self {
        match self {
            Self::Api => Self::Date,
            Self::Date => Self::Opponent,
            Self::Opponent => Self::Stage,
            Self::Stage => Self::Api,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Api => "LISTED",
            Self::Date => "DATE",
            Self::Opponent => "OPPONENT",
            Self::Stage => "STAGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCommand {
    FetchStandings,
    FetchSeason {
        generation: u64,
        participant_id: String,
        team: Option<String>,
        range: SeasonRange,
    },
}

#[derive(Debug)]
pub enum Delta {
    SetStandings(StandingsTable),
    StandingsFailed {
        error: FetchError,
    },
    SetSeason {
        generation: u64,
        participant_id: String,
        batch: SeasonBatch,
    },
    SeasonFailed {
        generation: u64,
        error: FetchError,
    },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub stage_name: Option<String>,
    pub standings: Vec<StandingsRow>,
    pub standings_status: LoadStatus,
    pub season: Vec<SeasonRow>,
    pub season_status: LoadStatus,
    pub season_year: Option<i32>,
    pub active_team: Option<String>,
    pub active_team_id: Option<String>,
    /// Latest issued season request; responses carrying an older value are stale.
    pub season_generation: u64,
    pub selected: usize,
    pub season_scroll: u16,
    pub focus: Focus,
    pub sort: SortMode,
    pub season_sort: SeasonSort,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            stage_name: None,
            standings: Vec::with_capacity(16),
            standings_status: LoadStatus::Idle,
            season: Vec::with_capacity(32),
            season_status: LoadStatus::Idle,
            season_year: None,
            active_team: None,
            active_team_id: None,
            season_generation: 0,
            selected: 0,
            season_scroll: 0,
            focus: Focus::Standings,
            sort: SortMode::Table,
            season_sort: SeasonSort::Api,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    /// Yields a fetch only while nothing is held and nothing is in flight.
    pub fn request_standings(&mut self) -> Option<ProviderCommand> {
        if !self.standings.is_empty() || self.standings_status != LoadStatus::Idle {
            return None;
        }
        self.standings_status = LoadStatus::Loading;
        Some(ProviderCommand::FetchStandings)
    }

    pub fn retry_standings(&mut self) -> Option<ProviderCommand> {
        if self.standings_status != LoadStatus::Failed {
            return None;
        }
        self.standings_status = LoadStatus::Idle;
        self.push_log("[INFO] Retrying standings");
        self.request_standings()
    }

    pub fn select_row(
        &mut self,
        participant_id: Option<String>,
        team: Option<String>,
        range: SeasonRange,
    ) -> Option<ProviderCommand> {
        self.active_team = team.clone();
        let participant_id = participant_id.filter(|id| !id.is_empty())?;

        self.season_generation += 1;
        self.season_status = LoadStatus::Loading;
        self.season_year = Some(range.year());
        self.active_team_id = Some(participant_id.clone());
        Some(ProviderCommand::FetchSeason {
            generation: self.season_generation,
            participant_id,
            team,
            range,
        })
    }

    pub fn select_current(&mut self, range: SeasonRange) -> Option<ProviderCommand> {
        let (id, team) = match self.selected_row() {
            Some(row) => (Some(row.id.clone()), Some(row.team.clone())),
            None => (None, None),
        };
        self.select_row(id, team, range)
    }

    pub fn season_heading(&self) -> String {
        match (&self.active_team, self.season_year) {
            (Some(team), Some(year)) => format!("{team} {year} Season"),
            (Some(team), None) => format!("{team} Season"),
            (None, _) => "Select a team to view matches this season".to_string(),
        }
    }

    pub fn standings_view(&self) -> Vec<&StandingsRow> {
        let mut rows: Vec<&StandingsRow> = self.standings.iter().collect();
        match self.sort {
            SortMode::Table => {}
            SortMode::Points => rows.sort_by(|a, b| desc(a.points, b.points)),
            SortMode::Wins => rows.sort_by(|a, b| desc(a.wins, b.wins)),
            SortMode::GoalsFor => rows.sort_by(|a, b| desc(a.goals_for, b.goals_for)),
            SortMode::GoalsAgainst => {
                rows.sort_by(|a, b| desc(a.goals_against, b.goals_against))
            }
            SortMode::GoalDifference => {
                rows.sort_by(|a, b| desc(a.goal_difference(), b.goal_difference()))
            }
            SortMode::Team => rows.sort_by(|a, b| a.team.cmp(&b.team)),
        }
        rows
    }

    /// Season rows in display order; the held rows keep API order.
    pub fn season_view(&self) -> Vec<&SeasonRow> {
        let mut rows: Vec<&SeasonRow> = self.season.iter().collect();
        match self.season_sort {
            SeasonSort::Api => {}
            SeasonSort::Date => rows.sort_by(|a, b| a.date.cmp(&b.date)),
            SeasonSort::Opponent => rows.sort_by(|a, b| a.opponent.cmp(&b.opponent)),
            SeasonSort::Stage => rows.sort_by(|a, b| a.stage.cmp(&b.stage)),
        }
        rows
    }

    pub fn selected_row(&self) -> Option<&StandingsRow> {
        self.standings_view().get(self.selected).copied()
    }

    pub fn cycle_sort(&mut self) {
        let selected_id = self.selected_row().map(|row| row.id.clone());
        self.sort = self.sort.next();
        let idx = selected_id
            .and_then(|id| self.standings_view().iter().position(|row| row.id == id));
        if let Some(idx) = idx {
            self.selected = idx;
        }
        self.clamp_selection();
    }

    pub fn cycle_season_sort(&mut self) {
        self.season_sort = self.season_sort.next();
        self.season_scroll = 0;
    }

    /// Sorts whichever panel has focus.
    pub fn cycle_focused_sort(&mut self) {
        match self.focus {
            Focus::Standings => self.cycle_sort(),
            Focus::Season => self.cycle_season_sort(),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Standings => Focus::Season,
            Focus::Season => Focus::Standings,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Standings => {
                if self.selected + 1 < self.standings.len() {
                    self.selected += 1;
                }
            }
            Focus::Season => {
                let max = self.season.len().saturating_sub(1) as u16;
                self.season_scroll = self.season_scroll.saturating_add(1).min(max);
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::Standings => self.selected = self.selected.saturating_sub(1),
            Focus::Season => self.season_scroll = self.season_scroll.saturating_sub(1),
        }
    }

    pub fn clamp_selection(&mut self) {
        if self.standings.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.standings.len() {
            self.selected = self.standings.len() - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::debug!("{msg}");
        self.logs.push_back(msg);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

// Rows missing the stat sort after every row that has it.
fn desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetStandings(table) => {
            let count = table.rows.len();
            state.stage_name = table.stage_name;
            state.standings = table.rows;
            state.standings_status = LoadStatus::Loaded;
            state.clamp_selection();
            state.push_log(format!("[INFO] Standings loaded ({count} teams)"));
        }
        Delta::StandingsFailed { error } => {
            state.standings_status = LoadStatus::Failed;
            state.push_log(format!(
                "[WARN] Standings fetch failed ({}): {error}",
                error.kind()
            ));
        }
        Delta::SetSeason {
            generation,
            participant_id,
            batch,
        } => {
            if generation != state.season_generation {
                state.push_log(format!(
                    "[INFO] Dropped stale season response for {participant_id}"
                ));
                return;
            }
            let count = batch.rows.len();
            state.season = batch.rows;
            state.season_status = LoadStatus::Loaded;
            state.season_scroll = 0;
            let team = state.active_team.clone().unwrap_or(participant_id);
            state.push_log(format!("[INFO] Season loaded for {team} ({count} matches)"));
            if batch.unmatched > 0 {
                state.push_log(format!(
                    "[WARN] {} match(es) did not list {team} by name; opponent may be wrong",
                    batch.unmatched
                ));
            }
        }
        Delta::SeasonFailed { generation, error } => {
            if generation != state.season_generation {
                return;
            }
            state.season_status = LoadStatus::Failed;
            state.push_log(format!(
                "[WARN] Season fetch failed ({}): {error}",
                error.kind()
            ));
        }
    }
}
