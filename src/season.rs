use chrono::{Datelike, Local, NaiveDate};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::FetchError;
use crate::graphql::{decode_response, post_query};

pub const SEASON_QUERY: &str = r#"
query teamMatches($participantId: ID!, $fromDate: LocalDate!, $toDate: LocalDate!) {
  eventsByParticipantAndDateRange(participantId: $participantId, fromDate: $fromDate, toDate: $toDate) {
    startDate
    tournamentStage {
      name
    }
    participants {
      participant {
        name
      }
    }
  }
}
"#;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar year window, January 1 through December 31 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl SeasonRange {
    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1)?,
            to: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            from: today.with_ordinal(1).unwrap_or(today),
            to: today.with_month(12).and_then(|d| d.with_day(31)).unwrap_or(today),
        }
    }

    pub fn year(&self) -> i32 {
        self.from.year()
    }

    pub fn from_param(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRow {
    pub date: String,
    pub opponent: String,
    pub stage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeasonBatch {
    pub rows: Vec<SeasonRow>,
    /// Events where neither participant name equalled the active team.
    pub unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponent {
    Resolved(String),
    /// Active team matched neither side; the second participant is used.
    Fallback(String),
}

impl Opponent {
    pub fn name(&self) -> &str {
        match self {
            Self::Resolved(name) | Self::Fallback(name) => name,
        }
    }

    pub fn into_name(self) -> String {
        match self {
            Self::Resolved(name) | Self::Fallback(name) => name,
        }
    }
}

/// Names are compared exactly. A team whose display name differs between the
/// standings and events endpoints lands in `Opponent::Fallback`.
pub fn resolve_opponent(first: &str, second: &str, active_team: Option<&str>) -> Opponent {
    match active_team {
        Some(team) if team == first => Opponent::Resolved(second.to_string()),
        Some(team) if team == second => Opponent::Resolved(first.to_string()),
        _ => Opponent::Fallback(second.to_string()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeasonVariables<'a> {
    participant_id: &'a str,
    from_date: String,
    to_date: String,
}

#[derive(Debug, Deserialize)]
pub struct SeasonData {
    #[serde(rename = "eventsByParticipantAndDateRange")]
    events: Option<Vec<SeasonEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeasonEvent {
    start_date: String,
    tournament_stage: StageName,
    #[serde(default)]
    participants: Vec<EventParticipant>,
}

#[derive(Debug, Deserialize)]
struct StageName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EventParticipant {
    participant: ParticipantName,
}

#[derive(Debug, Deserialize)]
struct ParticipantName {
    name: String,
}

pub fn fetch_season(
    client: &Client,
    config: &Config,
    participant_id: &str,
    range: SeasonRange,
    active_team: Option<&str>,
) -> Result<SeasonBatch, FetchError> {
    let variables = SeasonVariables {
        participant_id,
        from_date: range.from_param(),
        to_date: range.to_param(),
    };
    let data: SeasonData = post_query(client, &config.endpoint, SEASON_QUERY, Some(variables))?;
    build_season(data, active_team)
}

pub fn parse_season_json(raw: &str, active_team: Option<&str>) -> Result<SeasonBatch, FetchError> {
    let data: SeasonData = decode_response(raw)?;
    build_season(data, active_team)
}

pub fn build_season(data: SeasonData, active_team: Option<&str>) -> Result<SeasonBatch, FetchError> {
    let events = data
        .events
        .ok_or_else(|| FetchError::shape("events list missing"))?;

    let mut batch = SeasonBatch {
        rows: Vec::with_capacity(events.len()),
        unmatched: 0,
    };
    for event in events {
        let [first, second, ..] = event.participants.as_slice() else {
            return Err(FetchError::shape(format!(
                "event on {} has {} participant(s), expected two",
                event.start_date,
                event.participants.len()
            )));
        };
        let opponent = resolve_opponent(
            &first.participant.name,
            &second.participant.name,
            active_team,
        );
        if matches!(opponent, Opponent::Fallback(_)) {
            batch.unmatched += 1;
        }
        batch.rows.push(SeasonRow {
            date: event.start_date,
            opponent: opponent.into_name(),
            stage: event.tournament_stage.name,
        });
    }
    Ok(batch)
}
