use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FetchError;
use crate::graphql::{decode_response, post_query};

pub const STANDINGS_QUERY: &str = r#"
query table($tournamentStageId: ID!) {
  tournamentStage(id: $tournamentStageId) {
    name
    standings(type: LEAGUE_TABLE) {
      participants {
        participant {
          name
          id
        }
        rank
        data {
          code
          value
        }
      }
    }
  }
}
"#;

/// Statistic codes the league table shows. Anything else in a participant's
/// `data` list is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCode {
    Played,
    Wins,
    Losses,
    Draws,
    GoalsFor,
    GoalsAgainst,
    Points,
}

impl StatCode {
    pub const ALL: [StatCode; 7] = [
        StatCode::Played,
        StatCode::Wins,
        StatCode::Losses,
        StatCode::Draws,
        StatCode::GoalsFor,
        StatCode::GoalsAgainst,
        StatCode::Points,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "played" => Some(Self::Played),
            "wins" => Some(Self::Wins),
            // The results service spells it this way.
            "defeits" => Some(Self::Losses),
            "draws" => Some(Self::Draws),
            "goalsfor" => Some(Self::GoalsFor),
            "goalsagainst" => Some(Self::GoalsAgainst),
            "points" => Some(Self::Points),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Played => "played",
            Self::Wins => "wins",
            Self::Losses => "defeits",
            Self::Draws => "draws",
            Self::GoalsFor => "goalsfor",
            Self::GoalsAgainst => "goalsagainst",
            Self::Points => "points",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::Played => "#Matches",
            Self::Wins => "Won",
            Self::Losses => "Lost",
            Self::Draws => "Drawn",
            Self::GoalsFor => "Scored",
            Self::GoalsAgainst => "Conceded",
            Self::Points => "Points",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandingsRow {
    pub id: String,
    pub team: String,
    pub rank: u32,
    pub played: Option<f64>,
    pub wins: Option<f64>,
    pub losses: Option<f64>,
    pub draws: Option<f64>,
    pub goals_for: Option<f64>,
    pub goals_against: Option<f64>,
    pub points: Option<f64>,
}

impl StandingsRow {
    pub fn new(id: impl Into<String>, team: impl Into<String>, rank: u32) -> Self {
        Self {
            id: id.into(),
            team: team.into(),
            rank,
            ..Self::default()
        }
    }

    pub fn stat(&self, code: StatCode) -> Option<f64> {
        match code {
            StatCode::Played => self.played,
            StatCode::Wins => self.wins,
            StatCode::Losses => self.losses,
            StatCode::Draws => self.draws,
            StatCode::GoalsFor => self.goals_for,
            StatCode::GoalsAgainst => self.goals_against,
            StatCode::Points => self.points,
        }
    }

    pub fn set_stat(&mut self, code: StatCode, value: f64) {
        let slot = match code {
            StatCode::Played => &mut self.played,
            StatCode::Wins => &mut self.wins,
            StatCode::Losses => &mut self.losses,
            StatCode::Draws => &mut self.draws,
            StatCode::GoalsFor => &mut self.goals_for,
            StatCode::GoalsAgainst => &mut self.goals_against,
            StatCode::Points => &mut self.points,
        };
        *slot = Some(value);
    }

    pub fn goal_difference(&self) -> Option<f64> {
        Some(self.goals_for? - self.goals_against?)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandingsTable {
    pub stage_name: Option<String>,
    pub rows: Vec<StandingsRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StandingsVariables<'a> {
    tournament_stage_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsData {
    tournament_stage: Option<TournamentStage>,
}

#[derive(Debug, Deserialize)]
struct TournamentStage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    standings: Vec<Standing>,
}

#[derive(Debug, Deserialize)]
struct Standing {
    #[serde(default)]
    participants: Vec<StandingParticipant>,
}

#[derive(Debug, Deserialize)]
struct StandingParticipant {
    participant: Participant,
    rank: u32,
    #[serde(default)]
    data: Vec<StatDataPoint>,
}

#[derive(Debug, Deserialize)]
struct Participant {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatDataPoint {
    pub code: String,
    pub value: String,
}

pub fn fetch_standings(client: &Client, config: &Config) -> Result<StandingsTable, FetchError> {
    let variables = StandingsVariables {
        tournament_stage_id: &config.tournament_stage_id,
    };
    let data: StandingsData =
        post_query(client, &config.endpoint, STANDINGS_QUERY, Some(variables))?;
    build_standings(data)
}

pub fn parse_standings_json(raw: &str) -> Result<StandingsTable, FetchError> {
    let data: StandingsData = decode_response(raw)?;
    build_standings(data)
}

pub fn build_standings(data: StandingsData) -> Result<StandingsTable, FetchError> {
    let stage = data
        .tournament_stage
        .ok_or_else(|| FetchError::shape("tournament stage not found"))?;
    let Some(table) = stage.standings.into_iter().next() else {
        return Err(FetchError::shape("tournament stage has no standings"));
    };

    let mut rows = Vec::with_capacity(table.participants.len());
    for entry in table.participants {
        let mut row = StandingsRow::new(entry.participant.id, entry.participant.name, entry.rank);
        for point in &entry.data {
            let Some(code) = StatCode::from_code(&point.code) else {
                continue;
            };
            let value = parse_stat_value(&point.value).ok_or_else(|| {
                FetchError::shape(format!(
                    "{} has non-numeric {}: {:?}",
                    row.team, point.code, point.value
                ))
            })?;
            row.set_stat(code, value);
        }
        rows.push(row);
    }

    Ok(StandingsTable {
        stage_name: stage.name.filter(|name| !name.trim().is_empty()),
        rows,
    })
}

fn parse_stat_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
